//! Fixed demo dataset used when a session starts without prior state.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use venturedesk_core::constants::{AVAILABILITY_COLOR, MEETING_COLOR, PENDING_COLOR};
use venturedesk_core::types::{MeetingType, UserRole};

use crate::model::{
    Attendee, AttendeeStatus, AvailabilitySlot, CalendarEvent, EventId, EventKind, ExtendedProps,
    MeetingRequest, MeetingStatus, RequestStatus, SlotRecurrence, TimeOfDay,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn hm(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::from_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[must_use]
pub fn mock_calendar_events() -> Vec<CalendarEvent> {
    vec![
        CalendarEvent {
            id: EventId::new("1"),
            title: "Weekly Availability".to_string(),
            start: utc(2024, 1, 1, 9, 0),
            end: utc(2024, 1, 1, 17, 0),
            all_day: false,
            color: AVAILABILITY_COLOR.to_string(),
            kind: EventKind::Availability,
            extended_props: ExtendedProps {
                description: Some("Available for meetings".to_string()),
                meeting_type: Some(MeetingType::Video),
                duration: Some(30),
                ..ExtendedProps::default()
            },
        },
        CalendarEvent {
            id: EventId::new("2"),
            title: "Meeting with Investor".to_string(),
            start: utc(2024, 1, 2, 14, 0),
            end: utc(2024, 1, 2, 14, 30),
            all_day: false,
            color: MEETING_COLOR.to_string(),
            kind: EventKind::Meeting {
                status: MeetingStatus::Confirmed,
            },
            extended_props: ExtendedProps {
                description: Some("Pitch presentation".to_string()),
                location: Some("Zoom Meeting".to_string()),
                attendees: vec![
                    Attendee::new("101", "John Entrepreneur", "john@startup.com", UserRole::Entrepreneur)
                        .with_status(AttendeeStatus::Accepted),
                    Attendee::new("102", "Sarah Investor", "sarah@vc.com", UserRole::Investor)
                        .with_status(AttendeeStatus::Accepted),
                ],
                meeting_type: Some(MeetingType::Video),
                meeting_link: Some("https://zoom.us/j/123456".to_string()),
                duration: Some(30),
                notes: Some("Prepare pitch deck".to_string()),
                ..ExtendedProps::default()
            },
        },
        CalendarEvent {
            id: EventId::new("3"),
            title: "Team Sync".to_string(),
            start: utc(2024, 1, 3, 10, 0),
            end: utc(2024, 1, 3, 11, 0),
            all_day: false,
            color: PENDING_COLOR.to_string(),
            kind: EventKind::Meeting {
                status: MeetingStatus::Pending,
            },
            extended_props: ExtendedProps {
                description: Some("Weekly team sync".to_string()),
                location: Some("Conference Room A".to_string()),
                meeting_type: Some(MeetingType::InPerson),
                duration: Some(60),
                ..ExtendedProps::default()
            },
        },
    ]
}

#[must_use]
pub fn mock_availability_slots() -> Vec<AvailabilitySlot> {
    vec![
        AvailabilitySlot {
            id: "avail-1".to_string(),
            user_id: "user-123".to_string(),
            day_of_week: 1,
            start_time: hm(9, 0),
            end_time: hm(17, 0),
            recurrence: Some(SlotRecurrence::Weekly),
            max_meetings_per_day: Some(5),
            meeting_types: vec![MeetingType::Video, MeetingType::Phone, MeetingType::InPerson],
        },
        AvailabilitySlot {
            id: "avail-2".to_string(),
            user_id: "user-123".to_string(),
            day_of_week: 2,
            start_time: hm(10, 0),
            end_time: hm(16, 0),
            recurrence: Some(SlotRecurrence::Weekly),
            max_meetings_per_day: Some(3),
            meeting_types: vec![MeetingType::Video],
        },
    ]
}

#[must_use]
pub fn mock_meeting_requests() -> Vec<MeetingRequest> {
    let created = utc(2024, 1, 1, 8, 0);
    vec![
        MeetingRequest {
            id: "req-1".to_string(),
            title: "Funding Discussion".to_string(),
            requester_id: "ent-456".to_string(),
            requested_user_id: "inv-789".to_string(),
            requested_date: date(2024, 1, 5),
            start_time: hm(14, 0),
            end_time: hm(14, 30),
            duration: 30,
            purpose: "Discuss seed funding round".to_string(),
            meeting_type: MeetingType::Video,
            status: RequestStatus::Pending,
            created_at: created,
            updated_at: created,
        },
        MeetingRequest {
            id: "req-2".to_string(),
            title: "Product Demo".to_string(),
            requester_id: "inv-789".to_string(),
            requested_user_id: "ent-456".to_string(),
            requested_date: date(2024, 1, 6),
            start_time: hm(11, 0),
            end_time: hm(12, 0),
            duration: 60,
            purpose: "Demo of new features".to_string(),
            meeting_type: MeetingType::Video,
            status: RequestStatus::Accepted,
            created_at: created,
            updated_at: created,
        },
    ]
}
