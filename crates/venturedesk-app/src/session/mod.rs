//! Scripted scheduling session run by the `venturedesk` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::{DateTime, TimeDelta, Utc};
use venturedesk_core::config::{CalendarConfig, Settings};
use venturedesk_core::constants::DEFAULT_SNAPSHOT_FILE;
use venturedesk_schedule::availability::AvailabilityManager;
use venturedesk_schedule::backend::{Latency, SimulatedBackend};
use venturedesk_schedule::collab::{SessionUser, StaticIdentity, TracingNotifier};
use venturedesk_schedule::dashboard::{MeetingCounter, TimeUntil, upcoming_meetings};
use venturedesk_schedule::model::time::resolve_local;
use venturedesk_schedule::model::{
    AvailabilityForm, CalendarEvent, Decision, EventId, EventType, MeetingForm, TimeOfDay,
};
use venturedesk_schedule::negotiation::MeetingNegotiation;
use venturedesk_schedule::persist::Snapshot;
use venturedesk_schedule::seed::{mock_availability_slots, mock_meeting_requests};
use venturedesk_schedule::store::EventStore;
use venturedesk_schedule::view::{CalendarView, ViewAction, WidgetEvent};

/// How far ahead recurring slots are materialized.
const SLOT_HORIZON_DAYS: i64 = 28;
const PITCH_TITLE: &str = "Investor pitch";

#[derive(Debug)]
pub struct SessionReport {
    pub widgets: Vec<WidgetEvent>,
    pub upcoming: Vec<(CalendarEvent, TimeUntil)>,
    pub upcoming_count: usize,
}

#[must_use]
pub fn snapshot_path(calendar: &CalendarConfig) -> PathBuf {
    calendar
        .storage_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE))
}

/// ## Summary
/// Opens the session store from the snapshot file if one exists, otherwise
/// from the mock dataset or empty, depending on `calendar.seed_mock_data`.
///
/// ## Errors
/// Returns an error if an existing snapshot cannot be read or parsed.
pub fn open_store(calendar: &CalendarConfig) -> Result<EventStore> {
    let path = snapshot_path(calendar);
    let prior = Snapshot::load_from(&path)?.map(|snapshot| snapshot.events);
    if let Some(events) = &prior {
        tracing::info!(path = %path.display(), count = events.len(), "Restored calendar");
    }
    let prior = prior.or_else(|| (!calendar.seed_mock_data).then(Vec::new));
    Ok(EventStore::open(prior))
}

/// ## Summary
/// Drives one scheduling session against `store` through the simulated
/// backend: opens an availability window for today, materializes the demo
/// slots, imports the demo requests, then requests and accepts a meeting for
/// tomorrow afternoon.
///
/// Steps whose result is already on the calendar are skipped, so running the
/// session again over a restored store leaves it unchanged.
///
/// ## Errors
/// Returns the first scheduling error encountered.
#[tracing::instrument(skip_all, fields(user = %settings.session.user_id, %now))]
pub async fn run_session<L: Latency>(
    settings: &Settings,
    store: Arc<EventStore>,
    latency: L,
    now: DateTime<Utc>,
) -> Result<SessionReport> {
    let tz = settings.calendar.tz()?;
    let notifier = Arc::new(TracingNotifier);
    let identity = Arc::new(StaticIdentity::signed_in(SessionUser::from(&settings.session)));

    let availability = Arc::new(
        AvailabilityManager::new(Arc::clone(&store), notifier.clone())
            .with_timezone(tz)
            .with_expansion_limit(settings.calendar.expansion_limit),
    );
    let negotiation =
        Arc::new(MeetingNegotiation::new(Arc::clone(&store), notifier, identity).with_timezone(tz));
    let backend = SimulatedBackend::new(negotiation, Arc::clone(&availability), latency);
    let counter = MeetingCounter::attach(&store);

    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today + TimeDelta::days(1);
    let view = CalendarView::new(Arc::clone(&store), today);
    tracing::debug!(title = %view.title(), "Calendar opened");

    let opening = resolve_local(today, "09:00".parse::<TimeOfDay>()?, tz)?;
    if has_event(&store, EventType::Availability, opening, None) {
        tracing::debug!(%opening, "Availability already open for today");
    } else {
        let ViewAction::OpenAvailabilityForm { date } = view.add_availability(opening) else {
            bail!("availability button did not open the availability form");
        };
        backend
            .create_availability(date, &AvailabilityForm::default())
            .await?;
    }

    for slot in mock_availability_slots() {
        availability.materialize_slot(&slot, now, now + TimeDelta::days(SLOT_HORIZON_DAYS))?;
    }

    for request in mock_meeting_requests() {
        if store.get(&EventId::new(request.id.as_str())).is_some() {
            tracing::debug!(request_id = %request.id, "Request already on the calendar");
            continue;
        }
        backend.import_request(&request).await?;
    }

    let pitch = resolve_local(tomorrow, "14:00".parse::<TimeOfDay>()?, tz)?;
    if has_event(&store, EventType::Meeting, pitch, Some(PITCH_TITLE)) {
        tracing::debug!(%pitch, "Pitch already scheduled");
    } else {
        let ViewAction::OpenMeetingForm { date } =
            view.on_date_range_select(pitch, pitch + TimeDelta::minutes(30))
        else {
            bail!("date selection did not open the meeting form");
        };
        let form = MeetingForm {
            title: PITCH_TITLE.to_string(),
            description: "Walk through the seed deck".to_string(),
            ..MeetingForm::default()
        };
        let meeting = backend.request_meeting(date, &form).await?;
        backend.respond(&meeting.id, Decision::Accepted).await?;
    }

    let upcoming = upcoming_meetings(&store.load())
        .into_iter()
        .map(|event| {
            let until = TimeUntil::compute(now, event.start);
            (event, until)
        })
        .collect();

    Ok(SessionReport {
        widgets: view.render(),
        upcoming,
        upcoming_count: counter.count(),
    })
}

fn has_event(
    store: &EventStore,
    event_type: EventType,
    start: DateTime<Utc>,
    title: Option<&str>,
) -> bool {
    store.load().iter().any(|event| {
        event.event_type() == event_type
            && event.start == start
            && title.is_none_or(|title| event.title == title)
    })
}
