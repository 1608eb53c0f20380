//! Cross-component flows: widget callbacks driving the managers, with
//! dashboard observers following along.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use venturedesk_schedule::collab::AlwaysConfirm;
use venturedesk_schedule::dashboard::{MeetingCounter, TimeUntil, upcoming_meetings};
use venturedesk_schedule::error::{ScheduleError, ScheduleResult};
use venturedesk_schedule::model::{Decision, EventId, MeetingForm, MeetingStatus};
use venturedesk_schedule::seed::{mock_availability_slots, mock_meeting_requests};
use venturedesk_schedule::view::{CalendarView, EventTone, ViewAction};

use super::helpers::*;

#[test_log::test]
fn select_request_accept_shows_in_view_and_counter() -> ScheduleResult<()> {
    let harness = Harness::seeded();
    let counter = MeetingCounter::attach(&harness.store);
    let view = CalendarView::new(
        Arc::clone(&harness.store),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
    );
    assert_eq!(counter.count(), 2);

    let ViewAction::OpenMeetingForm { date } =
        view.on_date_range_select(utc(12, 15, 0), utc(12, 16, 0))
    else {
        return Err(ScheduleError::InvariantViolation("range select must open the meeting form"));
    };
    let form = MeetingForm {
        title: "Board prep".to_string(),
        ..MeetingForm::default()
    };
    let meeting = harness.negotiation.request_meeting(date, &form)?;
    assert_eq!(counter.count(), 3);

    let ViewAction::ViewMeeting(clicked) = view.on_event_click(&meeting.id)? else {
        return Err(ScheduleError::InvariantViolation("meeting click must open the viewer"));
    };
    harness.negotiation.respond(&clicked.id, Decision::Accepted)?;

    let rendered = view.render();
    let widget = rendered
        .iter()
        .find(|w| w.id == meeting.id)
        .ok_or_else(|| ScheduleError::NotFound(meeting.id.clone()))?;
    assert_eq!(widget.extended_props.status, Some(MeetingStatus::Confirmed));
    assert_eq!(widget.extended_props.tone, EventTone::Blue);

    harness.negotiation.delete_meeting(&meeting.id, &AlwaysConfirm)?;
    assert_eq!(counter.count(), 2);
    assert!(matches!(
        view.on_event_click(&meeting.id),
        Err(ScheduleError::NotFound(_))
    ));
    Ok(())
}

#[test_log::test]
fn slots_and_requests_feed_the_calendar() -> ScheduleResult<()> {
    let harness = Harness::empty();
    let counter = MeetingCounter::attach(&harness.store);

    let from = utc(1, 0, 0);
    for slot in mock_availability_slots() {
        harness
            .availability
            .materialize_slot(&slot, from, from + TimeDelta::days(14))?;
    }
    assert_eq!(harness.store.len(), 4);
    assert_eq!(counter.count(), 0);

    for request in mock_meeting_requests() {
        harness.negotiation.import_request(&request)?;
    }
    assert_eq!(counter.count(), 2);

    let upcoming = upcoming_meetings(&harness.store.load());
    let ids: Vec<&str> = upcoming.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["req-1", "req-2"]);
    assert_eq!(
        TimeUntil::compute(utc(5, 12, 0), upcoming[0].start).to_string(),
        "In 2h"
    );

    let pending = EventId::new("req-1");
    harness.negotiation.respond(&pending, Decision::Declined)?;
    assert_eq!(counter.count(), 1);
    Ok(())
}
