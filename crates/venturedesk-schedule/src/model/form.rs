//! User-entered forms for availability and meetings.

use serde::{Deserialize, Serialize};
use venturedesk_core::constants::{MAX_MEETINGS_PER_DAY, MIN_MEETINGS_PER_DAY};
use venturedesk_core::types::MeetingType;

use super::time::TimeOfDay;
use crate::error::{ScheduleError, ScheduleResult};

/// Repeat choice offered by the availability form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormRecurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Weekdays,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityForm {
    pub start_time: String,
    pub end_time: String,
    pub meeting_type: MeetingType,
    pub recurrence: FormRecurrence,
    pub max_meetings: u32,
    /// Minutes.
    pub duration: u32,
}

impl Default for AvailabilityForm {
    fn default() -> Self {
        Self {
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            meeting_type: MeetingType::Video,
            recurrence: FormRecurrence::None,
            max_meetings: 5,
            duration: 30,
        }
    }
}

impl AvailabilityForm {
    /// ## Summary
    /// Validates the form and returns the parsed time window.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if a time is malformed, the start is
    /// not before the end, the duration is zero, or the daily cap is outside
    /// 1-20.
    pub fn validate(&self) -> ScheduleResult<(TimeOfDay, TimeOfDay)> {
        let start: TimeOfDay = self.start_time.parse()?;
        let end: TimeOfDay = self.end_time.parse()?;
        if start >= end {
            return Err(ScheduleError::Validation(format!(
                "start time {start} must be before end time {end}"
            )));
        }
        if self.duration == 0 {
            return Err(ScheduleError::Validation(
                "meeting duration must be at least one minute".to_string(),
            ));
        }
        if !(MIN_MEETINGS_PER_DAY..=MAX_MEETINGS_PER_DAY).contains(&self.max_meetings) {
            return Err(ScheduleError::Validation(format!(
                "max meetings per day must be between {MIN_MEETINGS_PER_DAY} and {MAX_MEETINGS_PER_DAY}"
            )));
        }
        Ok((start, end))
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("Available ({})", self.meeting_type)
    }

    #[must_use]
    pub fn description(&self) -> String {
        format!("Available from {} to {}", self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingForm {
    pub title: String,
    pub description: String,
    pub meeting_type: MeetingType,
    /// Minutes.
    pub duration: u32,
    pub notes: String,
}

impl Default for MeetingForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            meeting_type: MeetingType::Video,
            duration: 30,
            notes: String::new(),
        }
    }
}

impl MeetingForm {
    /// ## Errors
    /// Returns `ScheduleError::Validation` for a blank title or zero duration.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.title.trim().is_empty() {
            return Err(ScheduleError::Validation(
                "meeting title is required".to_string(),
            ));
        }
        if self.duration == 0 {
            return Err(ScheduleError::Validation(
                "meeting duration must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }
}

/// Empty strings mean "not provided".
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
