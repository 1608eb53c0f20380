//! Participants embedded in meeting events.

use serde::{Deserialize, Serialize};
use venturedesk_core::types::UserRole;

use super::event::Decision;

/// Participation status of a single attendee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Tentative,
}

impl AttendeeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }
}

impl From<Decision> for AttendeeStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => Self::Accepted,
            Decision::Declined => Self::Declined,
        }
    }
}

impl std::fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meeting participant. Owned by the event that embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub status: AttendeeStatus,
}

impl Attendee {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar: None,
            role,
            status: AttendeeStatus::Pending,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: AttendeeStatus) -> Self {
        self.status = status;
        self
    }
}
