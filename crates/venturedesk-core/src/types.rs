use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Marketplace role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Entrepreneur,
    Investor,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entrepreneur => "entrepreneur",
            Self::Investor => "investor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrepreneur" => Ok(Self::Entrepreneur),
            "investor" => Ok(Self::Investor),
            "admin" => Ok(Self::Admin),
            other => Err(CoreError::InvalidInput(format!("unknown user role '{other}'"))),
        }
    }
}

/// How a meeting takes place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    #[default]
    Video,
    Phone,
    InPerson,
}

impl MeetingType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Phone => "phone",
            Self::InPerson => "in-person",
        }
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeetingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "phone" => Ok(Self::Phone),
            "in-person" => Ok(Self::InPerson),
            other => Err(CoreError::InvalidInput(format!(
                "unknown meeting type '{other}'"
            ))),
        }
    }
}
