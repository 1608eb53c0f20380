#![allow(dead_code, clippy::expect_used)]
//! Shared fixtures: one store wired to every component, with a recording
//! notifier and a signed-in investor.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use venturedesk_core::types::UserRole;
use venturedesk_schedule::availability::AvailabilityManager;
use venturedesk_schedule::collab::{RecordingNotifier, SessionUser, StaticIdentity};
use venturedesk_schedule::negotiation::MeetingNegotiation;
use venturedesk_schedule::store::EventStore;

pub struct Harness {
    pub store: Arc<EventStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub availability: AvailabilityManager,
    pub negotiation: MeetingNegotiation,
}

impl Harness {
    pub fn new(store: EventStore) -> Self {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let identity = Arc::new(StaticIdentity::signed_in(investor()));
        Self {
            availability: AvailabilityManager::new(Arc::clone(&store), notifier.clone()),
            negotiation: MeetingNegotiation::new(Arc::clone(&store), notifier.clone(), identity),
            store,
            notifier,
        }
    }

    pub fn empty() -> Self {
        Self::new(EventStore::empty())
    }

    pub fn seeded() -> Self {
        Self::new(EventStore::open(None))
    }
}

pub fn investor() -> SessionUser {
    SessionUser {
        id: "102".to_string(),
        name: "Sarah Investor".to_string(),
        email: "sarah@vc.com".to_string(),
        role: UserRole::Investor,
    }
}

pub fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}
