use std::path::PathBuf;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{ENV_PREFIX, ENV_SEPARATOR};
use crate::error::{CoreError, CoreResult};
use crate::types::UserRole;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
    pub simulation: SimulationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// IANA zone name used to interpret `HH:MM` availability times.
    pub timezone: String,
    pub seed_mock_data: bool,
    /// Upper bound on occurrences produced by a single slot expansion.
    pub expansion_limit: u16,
    pub storage_path: Option<PathBuf>,
}

impl CalendarConfig {
    /// ## Summary
    /// Resolves the configured time zone name.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the name is not a known IANA zone.
    pub fn tz(&self) -> CoreResult<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|err| {
            CoreError::ConfigError(format!("invalid calendar.timezone '{}': {err}", self.timezone))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Fixed delay applied to every simulated backend call.
    pub latency_ms: u64,
}

impl SimulationConfig {
    #[must_use]
    pub const fn latency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml` into a `Settings`.
    ///
    /// Environment variables use the `VENTUREDESK__SECTION__KEY` form.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating the result fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("logging.level", "debug")?
            .set_default("calendar.timezone", "UTC")?
            .set_default("calendar.seed_mock_data", true)?
            .set_default("calendar.expansion_limit", 366)?
            .set_default("simulation.latency_ms", 1000)?
            .set_default("session.user_id", "e1")?
            .set_default("session.name", "Sarah Johnson")?
            .set_default("session.email", "sarah@techwave.io")?
            .set_default("session.role", "entrepreneur")?
            // Env file
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints that deserialization cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` for an unknown time zone or a zero
    /// expansion limit.
    pub fn validate(&self) -> CoreResult<()> {
        self.calendar.tz()?;
        if self.calendar.expansion_limit == 0 {
            return Err(CoreError::ConfigError(
                "calendar.expansion_limit must be at least 1".to_string(),
            ));
        }
        if self.session.user_id.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "session.user_id must not be empty".to_string(),
            ));
        }
        tracing::trace!(timezone = %self.calendar.timezone, "Configuration validated");
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
