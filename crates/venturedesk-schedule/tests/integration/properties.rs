//! Behavioural guarantees of the scheduling core, one test per guarantee.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::TimeDelta;
use venturedesk_schedule::collab::AlwaysConfirm;
use venturedesk_schedule::error::{ScheduleError, ScheduleResult};
use venturedesk_schedule::model::{
    AvailabilityForm, Decision, EventType, MeetingForm, MeetingStatus,
};
use venturedesk_schedule::persist::Snapshot;
use venturedesk_schedule::store::EventStore;

use super::helpers::*;

fn meeting_form() -> MeetingForm {
    MeetingForm {
        title: "Series A intro".to_string(),
        ..MeetingForm::default()
    }
}

/// ## Summary
/// A default availability form yields exactly one availability event
/// spanning the form duration, with no meeting status.
#[test_log::test]
fn create_availability_adds_one_statusless_event() -> ScheduleResult<()> {
    let harness = Harness::empty();
    let date = utc(8, 9, 0);
    let form = AvailabilityForm {
        start_time: "09:00".to_string(),
        end_time: "17:00".to_string(),
        duration: 30,
        ..AvailabilityForm::default()
    };

    harness.availability.create_availability(date, &form)?;

    let events = harness.store.load();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_type(), EventType::Availability);
    assert_eq!(event.start, date);
    assert_eq!(event.end, date + TimeDelta::minutes(30));
    assert_eq!(event.status(), None);

    let json = serde_json::to_value(event)?;
    assert!(json.get("status").is_none());
    Ok(())
}

#[test_log::test]
fn meeting_lifecycle_ends_in_terminal_status() -> ScheduleResult<()> {
    let harness = Harness::empty();

    let accepted = harness.negotiation.request_meeting(utc(9, 10, 0), &meeting_form())?;
    assert_eq!(accepted.status(), Some(MeetingStatus::Pending));
    let accepted = harness.negotiation.respond(&accepted.id, Decision::Accepted)?;
    assert_eq!(accepted.status(), Some(MeetingStatus::Confirmed));

    let declined = harness.negotiation.request_meeting(utc(9, 11, 0), &meeting_form())?;
    let declined = harness.negotiation.respond(&declined.id, Decision::Declined)?;
    assert_eq!(declined.status(), Some(MeetingStatus::Declined));

    for (event, decision) in [
        (&accepted, Decision::Declined),
        (&declined, Decision::Accepted),
    ] {
        assert!(matches!(
            harness.negotiation.respond(&event.id, decision),
            Err(ScheduleError::InvalidTransition { .. })
        ));
    }
    Ok(())
}

/// ## Summary
/// Deleting twice leaves the store as the first delete did; the second call
/// reports `NotFound` instead of silently succeeding.
#[test_log::test]
fn second_delete_changes_nothing() -> ScheduleResult<()> {
    let harness = Harness::seeded();
    let meeting = harness.negotiation.request_meeting(utc(9, 10, 0), &meeting_form())?;

    harness.negotiation.delete_meeting(&meeting.id, &AlwaysConfirm)?;
    let after_first = harness.store.load();
    let revision = harness.store.revision();

    let second = harness.negotiation.delete_meeting(&meeting.id, &AlwaysConfirm);
    assert!(matches!(second, Err(ScheduleError::NotFound(_))));
    assert_eq!(*harness.store.load(), *after_first);
    assert_eq!(harness.store.revision(), revision);
    Ok(())
}

#[test_log::test]
fn observers_never_see_partial_lists() -> ScheduleResult<()> {
    let harness = Harness::seeded();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let reader = Arc::clone(&harness.store);
    let sink = Arc::clone(&seen);
    let _sub = harness.store.subscribe(move |change| {
        let current = reader.load();
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((change.events.len(), current.len(), *current == *change.events));
    });

    let created = harness
        .availability
        .create_availability(utc(8, 9, 0), &AvailabilityForm::default())?;
    let meeting = harness.negotiation.request_meeting(utc(9, 10, 0), &meeting_form())?;
    harness.negotiation.respond(&meeting.id, Decision::Accepted)?;
    harness.availability.delete_availability(&created.id, &AlwaysConfirm)?;

    let seen = seen.lock().unwrap_or_else(PoisonError::into_inner).clone();
    assert_eq!(
        seen,
        vec![(4, 4, true), (5, 5, true), (5, 5, true), (4, 4, true)]
    );
    Ok(())
}

#[test_log::test]
fn snapshot_round_trip_is_field_for_field() -> ScheduleResult<()> {
    let harness = Harness::seeded();
    harness.negotiation.request_meeting(utc(9, 10, 0), &meeting_form())?;
    harness
        .availability
        .create_availability(utc(8, 9, 0), &AvailabilityForm::default())?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("calendar.json");
    harness.store.snapshot(utc(10, 0, 0)).save_to(&path)?;

    let reloaded = Snapshot::load_from(&path)?.ok_or(ScheduleError::InvariantViolation(
        "snapshot file vanished",
    ))?;
    let restored = EventStore::open(Some(reloaded.events));
    assert_eq!(*restored.load(), *harness.store.load());
    Ok(())
}

#[test_log::test]
fn degenerate_forms_are_rejected() {
    let harness = Harness::empty();
    let same_times = AvailabilityForm {
        start_time: "10:00".to_string(),
        end_time: "10:00".to_string(),
        ..AvailabilityForm::default()
    };
    let zero_duration = AvailabilityForm {
        duration: 0,
        ..AvailabilityForm::default()
    };

    for form in [same_times, zero_duration] {
        assert!(matches!(
            harness.availability.create_availability(utc(8, 9, 0), &form),
            Err(ScheduleError::Validation(_))
        ));
    }
    assert!(harness.store.is_empty());
    assert_eq!(harness.notifier.notices().len(), 2);
}
