//! Meeting lifecycle: request, edit, respond, delete and import.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use venturedesk_core::constants::MEETING_ID_PREFIX;

use crate::collab::{Confirm, Deletion, IdentityProvider, Notifier};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::form::non_empty;
use crate::model::{
    AttendeeStatus, CalendarEvent, Decision, EventId, EventKind, EventType, ExtendedProps,
    MeetingForm, MeetingRequest, MeetingStatus,
};
use crate::store::EventStore;

const DELETE_PROMPT: &str = "Are you sure you want to delete this meeting?";

pub struct MeetingNegotiation {
    store: Arc<EventStore>,
    notifier: Arc<dyn Notifier>,
    identity: Arc<dyn IdentityProvider>,
    tz: chrono_tz::Tz,
}

impl std::fmt::Debug for MeetingNegotiation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingNegotiation")
            .field("store", &self.store)
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}

impl MeetingNegotiation {
    #[must_use]
    pub fn new(
        store: Arc<EventStore>,
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            notifier,
            identity,
            tz: chrono_tz::UTC,
        }
    }

    /// Zone used to place imported requests, whose times are wall-clock.
    #[must_use]
    pub const fn with_timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.tz = tz;
        self
    }

    /// ## Summary
    /// Creates a pending meeting at `date` owned by the signed-in user.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotAuthenticated` without a current user and
    /// `ScheduleError::Validation` for an invalid form.
    #[tracing::instrument(skip(self, form), fields(%date, title = %form.title))]
    pub fn request_meeting(
        &self,
        date: DateTime<Utc>,
        form: &MeetingForm,
    ) -> ScheduleResult<CalendarEvent> {
        let result = self
            .identity
            .current_user()
            .ok_or(ScheduleError::NotAuthenticated)
            .and_then(|user| {
                form.validate()?;
                let event = CalendarEvent::new(
                    EventId::generate(MEETING_ID_PREFIX),
                    form.title.trim(),
                    date,
                    end_of(date, form.duration),
                    EventKind::Meeting {
                        status: MeetingStatus::Pending,
                    },
                )?
                .with_props(ExtendedProps {
                    description: non_empty(&form.description),
                    creator: Some(user.id),
                    meeting_type: Some(form.meeting_type),
                    duration: Some(form.duration),
                    notes: non_empty(&form.notes),
                    ..ExtendedProps::default()
                });
                self.store.append(event.clone())?;
                Ok(event)
            });

        let event = self.report(result)?;
        tracing::debug!(event_id = %event.id, "Meeting requested");
        self.notifier.success("Meeting request sent successfully!");
        Ok(event)
    }

    /// ## Summary
    /// Rewrites a meeting's title, times, description, type and notes from
    /// the form. The status is left untouched.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` for an invalid form,
    /// `ScheduleError::NotFound` for an unknown id, and
    /// `ScheduleError::WrongKind` if the event is not a meeting.
    #[tracing::instrument(skip(self, form), fields(event_id = %id, %date))]
    pub fn update_meeting(
        &self,
        id: &EventId,
        date: DateTime<Utc>,
        form: &MeetingForm,
    ) -> ScheduleResult<CalendarEvent> {
        let result = form.validate().and_then(|()| {
            self.store.update_by_id(id, |event| {
                event.expect_type(EventType::Meeting)?;
                event.title = form.title.trim().to_string();
                event.start = date;
                event.end = end_of(date, form.duration);
                let props = &mut event.extended_props;
                props.description = non_empty(&form.description);
                props.meeting_type = Some(form.meeting_type);
                props.duration = Some(form.duration);
                props.notes = non_empty(&form.notes);
                Ok(())
            })
        });

        let event = self.report(result)?;
        self.notifier.success("Meeting updated successfully!");
        Ok(event)
    }

    /// ## Summary
    /// Accepts or declines a pending meeting.
    ///
    /// `Accepted` stores `confirmed`. When the current user is listed as an
    /// attendee, their attendee status follows the decision.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` for an unknown id,
    /// `ScheduleError::WrongKind` for a non-meeting, and
    /// `ScheduleError::InvalidTransition` unless the meeting is pending.
    #[tracing::instrument(skip(self), fields(event_id = %id, ?decision))]
    pub fn respond(&self, id: &EventId, decision: Decision) -> ScheduleResult<CalendarEvent> {
        let responder = self.identity.current_user().map(|user| user.id);
        let result = self.store.update_by_id(id, |event| {
            let EventKind::Meeting { status } = event.kind else {
                return Err(ScheduleError::WrongKind {
                    id: id.clone(),
                    expected: EventType::Meeting,
                    found: event.event_type(),
                });
            };
            let next = status
                .apply(decision)
                .ok_or_else(|| ScheduleError::InvalidTransition {
                    id: id.clone(),
                    from: status,
                    to: decision.resulting_status(),
                })?;
            event.kind = EventKind::Meeting { status: next };

            if let Some(responder) = &responder {
                for attendee in &mut event.extended_props.attendees {
                    if &attendee.id == responder {
                        attendee.status = AttendeeStatus::from(decision);
                    }
                }
            }
            Ok(())
        });

        let event = self.report(result)?;
        tracing::debug!(status = ?event.status(), "Meeting answered");
        self.notifier.success(match decision {
            Decision::Accepted => "Meeting confirmed!",
            Decision::Declined => "Meeting declined!",
        });
        Ok(event)
    }

    /// ## Summary
    /// Asks for confirmation, then removes the meeting.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` for an unknown id and
    /// `ScheduleError::WrongKind` for a non-meeting, without prompting.
    #[tracing::instrument(skip(self, confirm), fields(event_id = %id))]
    pub fn delete_meeting(
        &self,
        id: &EventId,
        confirm: &impl Confirm,
    ) -> ScheduleResult<Deletion<CalendarEvent>> {
        let existing = self
            .store
            .get(id)
            .ok_or_else(|| ScheduleError::NotFound(id.clone()));
        let existing = self.report(existing)?;
        self.report(existing.expect_type(EventType::Meeting))?;

        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!("Deletion declined");
            return Ok(Deletion::Kept);
        }

        let removed = self.report(self.store.remove_by_id(id))?;
        self.notifier.success("Event deleted!");
        Ok(Deletion::Removed(removed))
    }

    /// ## Summary
    /// Adds a standalone meeting request to the calendar as a meeting event
    /// with the same id.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Conflict` if the request was already imported,
    /// or `ScheduleError::Validation` if its times cannot be placed.
    #[tracing::instrument(skip(self, request), fields(request_id = %request.id, status = ?request.status))]
    pub fn import_request(&self, request: &MeetingRequest) -> ScheduleResult<CalendarEvent> {
        let result = request.to_event(self.tz).and_then(|event| {
            self.store.append(event.clone())?;
            Ok(event)
        });
        let event = self.report(result)?;
        tracing::debug!(event_id = %event.id, "Meeting request imported");
        Ok(event)
    }

    fn report<T>(&self, result: ScheduleResult<T>) -> ScheduleResult<T> {
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Meeting operation failed");
            self.notifier.error(&err.to_string());
        }
        result
    }
}

fn end_of(start: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    start + TimeDelta::minutes(i64::from(minutes))
}
