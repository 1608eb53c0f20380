//! Meeting requests exchanged between entrepreneurs and investors before they
//! land on a calendar.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use venturedesk_core::constants::{MEETING_COLOR, PENDING_COLOR};
use venturedesk_core::types::MeetingType;

use super::event::{CalendarEvent, EventId, EventKind, ExtendedProps, MeetingStatus};
use super::time::{TimeOfDay, resolve_local};
use crate::error::{ScheduleError, ScheduleResult};

/// Status vocabulary of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl RequestStatus {
    /// Maps onto the canonical meeting status; `Accepted` becomes `Confirmed`.
    #[must_use]
    pub const fn meeting_status(self) -> MeetingStatus {
        match self {
            Self::Pending => MeetingStatus::Pending,
            Self::Accepted => MeetingStatus::Confirmed,
            Self::Declined => MeetingStatus::Declined,
            Self::Cancelled => MeetingStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub id: String,
    pub title: String,
    pub requester_id: String,
    pub requested_user_id: String,
    pub requested_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Minutes.
    pub duration: u32,
    pub purpose: String,
    pub meeting_type: MeetingType,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingRequest {
    /// ## Summary
    /// Builds the meeting event this request describes.
    ///
    /// The event id is derived from the request id so importing the same
    /// request twice collides in the store.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if the time window is empty or does
    /// not exist in `tz`.
    pub fn to_event(&self, tz: chrono_tz::Tz) -> ScheduleResult<CalendarEvent> {
        if self.start_time >= self.end_time {
            return Err(ScheduleError::Validation(format!(
                "request {} starts at {} but ends at {}",
                self.id, self.start_time, self.end_time
            )));
        }
        let start = resolve_local(self.requested_date, self.start_time, tz)?;
        let end = resolve_local(self.requested_date, self.end_time, tz)?;
        let status = self.status.meeting_status();
        let color = if status == MeetingStatus::Pending {
            PENDING_COLOR
        } else {
            MEETING_COLOR
        };

        let event = CalendarEvent::new(
            EventId::new(self.id.clone()),
            self.title.clone(),
            start,
            end,
            EventKind::Meeting { status },
        )?
        .with_color(color)
        .with_props(ExtendedProps {
            description: Some(self.purpose.clone()),
            creator: Some(self.requester_id.clone()),
            meeting_type: Some(self.meeting_type),
            duration: Some(self.duration),
            ..ExtendedProps::default()
        });
        Ok(event)
    }
}
