use thiserror::Error;

use crate::model::{EventId, EventType, MeetingStatus};

/// Scheduling errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event {id} is {found}, expected {expected}")]
    WrongKind {
        id: EventId,
        expected: EventType,
        found: EventType,
    },

    #[error("Meeting {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: EventId,
        from: MeetingStatus,
        to: MeetingStatus,
    },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] venturedesk_core::error::CoreError),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;
