//! Recurring weekly availability windows.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use venturedesk_core::types::MeetingType;

use super::time::TimeOfDay;
use crate::error::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRecurrence {
    Weekly,
    Biweekly,
    Monthly,
}

/// A weekly window in which a user accepts meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub user_id: String,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<SlotRecurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_meetings_per_day: Option<u32>,
    #[serde(default)]
    pub meeting_types: Vec<MeetingType>,
}

impl AvailabilitySlot {
    /// ## Summary
    /// Checks the day index and the time window.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if `day_of_week` is above 6, the
    /// window is empty, or the daily cap is zero.
    pub fn validate(&self) -> ScheduleResult<()> {
        self.weekday()?;
        if self.start_time >= self.end_time {
            return Err(ScheduleError::Validation(format!(
                "slot {} starts at {} but ends at {}",
                self.id, self.start_time, self.end_time
            )));
        }
        if self.max_meetings_per_day == Some(0) {
            return Err(ScheduleError::Validation(format!(
                "slot {} allows zero meetings per day",
                self.id
            )));
        }
        Ok(())
    }

    /// ## Summary
    /// Maps the Sunday-based day index onto a `chrono::Weekday`.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` for indices above 6.
    pub fn weekday(&self) -> ScheduleResult<Weekday> {
        match self.day_of_week {
            0 => Ok(Weekday::Sun),
            1 => Ok(Weekday::Mon),
            2 => Ok(Weekday::Tue),
            3 => Ok(Weekday::Wed),
            4 => Ok(Weekday::Thu),
            5 => Ok(Weekday::Fri),
            6 => Ok(Weekday::Sat),
            other => Err(ScheduleError::Validation(format!(
                "day of week {other} is outside 0-6"
            ))),
        }
    }

    #[must_use]
    pub fn accepts(&self, meeting_type: MeetingType) -> bool {
        self.meeting_types.is_empty() || self.meeting_types.contains(&meeting_type)
    }
}
