//! Availability windows: creating, editing and deleting `availability` events,
//! and materializing recurring slots.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use venturedesk_core::constants::AVAILABILITY_ID_PREFIX;

use crate::collab::{Confirm, Deletion, Notifier};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{
    AvailabilityForm, AvailabilitySlot, CalendarEvent, EventId, EventKind, EventType,
    ExtendedProps,
};
use crate::recurrence::expand_slot;
use crate::store::EventStore;

const DELETE_PROMPT: &str = "Are you sure you want to delete this availability slot?";
const DEFAULT_EXPANSION_LIMIT: u16 = 366;

pub struct AvailabilityManager {
    store: Arc<EventStore>,
    notifier: Arc<dyn Notifier>,
    tz: chrono_tz::Tz,
    expansion_limit: u16,
}

impl std::fmt::Debug for AvailabilityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityManager")
            .field("store", &self.store)
            .field("tz", &self.tz)
            .field("expansion_limit", &self.expansion_limit)
            .finish_non_exhaustive()
    }
}

impl AvailabilityManager {
    #[must_use]
    pub fn new(store: Arc<EventStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            tz: chrono_tz::UTC,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }

    /// Zone used to read wall-clock slot times.
    #[must_use]
    pub const fn with_timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.tz = tz;
        self
    }

    #[must_use]
    pub const fn with_expansion_limit(mut self, limit: u16) -> Self {
        self.expansion_limit = limit;
        self
    }

    /// ## Summary
    /// Validates the form and appends one availability event starting at
    /// `date` and lasting `form.duration` minutes.
    ///
    /// Overlap with existing events is not checked.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` for an invalid form. The message is
    /// also sent to the notifier.
    #[tracing::instrument(skip(self, form), fields(%date, meeting_type = %form.meeting_type))]
    pub fn create_availability(
        &self,
        date: DateTime<Utc>,
        form: &AvailabilityForm,
    ) -> ScheduleResult<CalendarEvent> {
        let result = form.validate().and_then(|_| {
            let event = CalendarEvent::new(
                EventId::generate(AVAILABILITY_ID_PREFIX),
                form.title(),
                date,
                date + TimeDelta::minutes(i64::from(form.duration)),
                EventKind::Availability,
            )?
            .with_props(ExtendedProps {
                description: Some(form.description()),
                meeting_type: Some(form.meeting_type),
                duration: Some(form.duration),
                ..ExtendedProps::default()
            });
            self.store.append(event.clone())?;
            Ok(event)
        });

        let event = self.report(result)?;
        tracing::debug!(event_id = %event.id, "Availability created");
        self.notifier.success("Availability added successfully!");
        Ok(event)
    }

    /// ## Summary
    /// Rewrites the title, description and meeting type of an availability
    /// event from the form.
    ///
    /// `start` and `end` are left as they are; only the descriptive fields
    /// follow the new times.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` for an invalid form,
    /// `ScheduleError::NotFound` for an unknown id, and
    /// `ScheduleError::WrongKind` if the event is not an availability event.
    #[tracing::instrument(skip(self, form), fields(event_id = %id))]
    pub fn update_availability(
        &self,
        id: &EventId,
        form: &AvailabilityForm,
    ) -> ScheduleResult<CalendarEvent> {
        let result = form.validate().and_then(|_| {
            self.store.update_by_id(id, |event| {
                event.expect_type(EventType::Availability)?;
                event.title = form.title();
                event.extended_props.description = Some(form.description());
                event.extended_props.meeting_type = Some(form.meeting_type);
                Ok(())
            })
        });

        let event = self.report(result)?;
        self.notifier.success("Availability updated successfully!");
        Ok(event)
    }

    /// ## Summary
    /// Asks for confirmation, then removes the availability event.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` for an unknown id and
    /// `ScheduleError::WrongKind` for a non-availability event. Neither
    /// prompts the user.
    #[tracing::instrument(skip(self, confirm), fields(event_id = %id))]
    pub fn delete_availability(
        &self,
        id: &EventId,
        confirm: &impl Confirm,
    ) -> ScheduleResult<Deletion<CalendarEvent>> {
        let existing = self
            .store
            .get(id)
            .ok_or_else(|| ScheduleError::NotFound(id.clone()));
        let existing = self.report(existing)?;
        self.report(existing.expect_type(EventType::Availability))?;

        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!("Deletion declined");
            return Ok(Deletion::Kept);
        }

        let removed = self.report(self.store.remove_by_id(id))?;
        self.notifier.success("Event deleted!");
        Ok(Deletion::Removed(removed))
    }

    /// ## Summary
    /// Expands a recurring slot over `[from, to)` and appends one availability
    /// event per occurrence in a single store mutation.
    ///
    /// Occurrence ids are derived from the slot id and the occurrence start,
    /// so occurrences already on the calendar are skipped. Only the newly
    /// added events are returned; nothing is broadcast when there are none.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` for an invalid slot or range, or
    /// `ScheduleError::Recurrence` if the rule cannot be evaluated.
    #[tracing::instrument(skip(self, slot), fields(slot_id = %slot.id))]
    pub fn materialize_slot(
        &self,
        slot: &AvailabilitySlot,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ScheduleResult<Vec<CalendarEvent>> {
        let result = expand_slot(slot, from, to, self.tz, self.expansion_limit).and_then(
            |occurrences| {
                let known = self.store.load();
                let events = occurrences
                    .into_iter()
                    .map(|occurrence| (occurrence_id(slot, occurrence.start), occurrence))
                    .filter(|(id, _)| !known.iter().any(|event| event.id == *id))
                    .map(|(id, occurrence)| {
                        CalendarEvent::new(
                            id,
                            slot_title(slot),
                            occurrence.start,
                            occurrence.end,
                            EventKind::Availability,
                        )
                        .map(|event| event.with_props(slot_props(slot)))
                    })
                    .collect::<ScheduleResult<Vec<_>>>()?;
                if !events.is_empty() {
                    self.store.extend(events.clone())?;
                }
                Ok(events)
            },
        );

        let events = self.report(result)?;
        tracing::debug!(count = events.len(), "Slot materialized");
        Ok(events)
    }

    fn report<T>(&self, result: ScheduleResult<T>) -> ScheduleResult<T> {
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Availability operation failed");
            self.notifier.error(&err.to_string());
        }
        result
    }
}

/// `avail-<slot id>-<start as YYYYMMDDTHHMMZ>`
fn occurrence_id(slot: &AvailabilitySlot, start: DateTime<Utc>) -> EventId {
    EventId::new(format!(
        "{AVAILABILITY_ID_PREFIX}-{}-{}",
        slot.id,
        start.format("%Y%m%dT%H%MZ")
    ))
}

fn slot_title(slot: &AvailabilitySlot) -> String {
    if slot.meeting_types.is_empty() {
        return "Available".to_string();
    }
    let types = slot
        .meeting_types
        .iter()
        .map(|ty| ty.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Available ({types})")
}

fn slot_props(slot: &AvailabilitySlot) -> ExtendedProps {
    ExtendedProps {
        description: Some(format!(
            "Available from {} to {}",
            slot.start_time, slot.end_time
        )),
        creator: Some(slot.user_id.clone()),
        meeting_type: match slot.meeting_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        },
        ..ExtendedProps::default()
    }
}
