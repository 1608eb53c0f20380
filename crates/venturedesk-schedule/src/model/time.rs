//! `HH:MM` wall-clock times used by availability forms and slots.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// A zero-padded 24-hour `HH:MM` time.
///
/// Ordering matches the lexical order of the `HH:MM` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    #[must_use]
    pub const fn from_time(time: NaiveTime) -> Self {
        Self(time)
    }

    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

/// ## Summary
/// Resolves a wall-clock date and time in `tz` to an instant.
///
/// Ambiguous local times (DST fall-back) take the earlier instant.
///
/// ## Errors
/// Returns `ScheduleError::Validation` when the local time does not exist in
/// `tz` (DST spring-forward gap).
pub fn resolve_local(
    date: NaiveDate,
    time: TimeOfDay,
    tz: chrono_tz::Tz,
) -> ScheduleResult<DateTime<Utc>> {
    let naive = date.and_time(time.time());
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ScheduleError::Validation(format!("{naive} does not exist in time zone {tz}"))
        })
}

impl std::str::FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == 5 && s.as_bytes().get(2) == Some(&b':');
        if !well_formed {
            return Err(ScheduleError::Validation(format!(
                "time '{s}' is not in HH:MM form"
            )));
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|err| ScheduleError::Validation(format!("time '{s}' is invalid: {err}")))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}
