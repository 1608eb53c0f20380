//! Calendar events and their closed set of kinds and statuses.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use venturedesk_core::constants::{AVAILABILITY_COLOR, BLOCKED_COLOR, MEETING_COLOR};
use venturedesk_core::types::MeetingType;

use super::attendee::Attendee;
use crate::error::{ScheduleError, ScheduleResult};

/// Identifier of a calendar event. Assigned once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh `<prefix>-<uuid v7>` identifier.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::now_v7()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Availability,
    Meeting,
    Blocked,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Meeting => "meeting",
            Self::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical lifecycle status of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Pending,
    Confirmed,
    Declined,
    Cancelled,
}

impl MeetingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only pending meetings accept a response.
    #[must_use]
    pub const fn apply(self, decision: Decision) -> Option<Self> {
        match self {
            Self::Pending => Some(decision.resulting_status()),
            Self::Confirmed | Self::Declined | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Statuses counted as "upcoming" by dashboards.
    #[must_use]
    pub const fn is_upcoming(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer given to a pending meeting request.
///
/// `Accepted` is stored as [`MeetingStatus::Confirmed`]; `Declined` keeps its
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Declined,
}

impl Decision {
    #[must_use]
    pub const fn resulting_status(self) -> MeetingStatus {
        match self {
            Self::Accepted => MeetingStatus::Confirmed,
            Self::Declined => MeetingStatus::Declined,
        }
    }
}

/// Kind of an event. Only meetings carry a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Availability,
    Meeting { status: MeetingStatus },
    Blocked,
}

impl EventKind {
    #[must_use]
    pub const fn event_type(self) -> EventType {
        match self {
            Self::Availability => EventType::Availability,
            Self::Meeting { .. } => EventType::Meeting,
            Self::Blocked => EventType::Blocked,
        }
    }

    #[must_use]
    pub const fn status(self) -> Option<MeetingStatus> {
        match self {
            Self::Meeting { status } => Some(status),
            Self::Availability | Self::Blocked => None,
        }
    }

    #[must_use]
    pub const fn default_color(self) -> &'static str {
        match self {
            Self::Availability => AVAILABILITY_COLOR,
            Self::Meeting { .. } => MEETING_COLOR,
            Self::Blocked => BLOCKED_COLOR,
        }
    }
}

/// Free-form details attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    /// User id of whoever created the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<MeetingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A schedulable calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all_day: bool,
    pub color: String,
    #[serde(flatten)]
    pub kind: EventKind,
    #[serde(default)]
    pub extended_props: ExtendedProps,
}

impl CalendarEvent {
    /// ## Summary
    /// Builds an event with the default color of its kind and empty details.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if `end` is not after `start`.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        kind: EventKind,
    ) -> ScheduleResult<Self> {
        let event = Self {
            id,
            title: title.into(),
            start,
            end,
            all_day: false,
            color: kind.default_color().to_string(),
            kind,
            extended_props: ExtendedProps::default(),
        };
        event.validate()?;
        Ok(event)
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: ExtendedProps) -> Self {
        self.extended_props = props;
        self
    }

    /// ## Summary
    /// Checks the invariants every stored event must hold.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if `end` is not strictly after `start`.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.end <= self.start {
            return Err(ScheduleError::Validation(format!(
                "event {} ends at {} which is not after its start {}",
                self.id, self.end, self.start
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    #[must_use]
    pub const fn status(&self) -> Option<MeetingStatus> {
        self.kind.status()
    }

    #[must_use]
    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// ## Summary
    /// Fails with `WrongKind` unless the event has the expected type.
    ///
    /// ## Errors
    /// Returns `ScheduleError::WrongKind` on mismatch.
    pub fn expect_type(&self, expected: EventType) -> ScheduleResult<()> {
        let found = self.event_type();
        if found == expected {
            Ok(())
        } else {
            Err(ScheduleError::WrongKind {
                id: self.id.clone(),
                expected,
                found,
            })
        }
    }
}
