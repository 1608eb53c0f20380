//! Dashboard summaries that follow the event store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::model::CalendarEvent;
use crate::store::{EventStore, Subscription};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

fn is_upcoming(event: &CalendarEvent) -> bool {
    event.status().is_some_and(|status| status.is_upcoming())
}

/// Pending and confirmed meetings ordered by start time.
#[must_use]
pub fn upcoming_meetings(events: &[CalendarEvent]) -> Vec<CalendarEvent> {
    let mut meetings: Vec<CalendarEvent> =
        events.iter().filter(|event| is_upcoming(event)).cloned().collect();
    meetings.sort_by_key(|event| event.start);
    meetings
}

/// Coarse "time until" badge shown next to an upcoming meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUntil {
    Past,
    Now,
    InHours(i64),
    InDays(i64),
}

impl TimeUntil {
    /// Whole hours are floored, so anything under an hour away is `Now`.
    #[must_use]
    pub fn compute(now: DateTime<Utc>, start: DateTime<Utc>) -> Self {
        let hours = (start - now).num_milliseconds().div_euclid(MILLIS_PER_HOUR);
        match hours {
            h if h < 0 => Self::Past,
            0 => Self::Now,
            h if h < 24 => Self::InHours(h),
            h => Self::InDays(h / 24),
        }
    }
}

impl std::fmt::Display for TimeUntil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Past => f.write_str("Past"),
            Self::Now => f.write_str("Now"),
            Self::InHours(h) => write!(f, "In {h}h"),
            Self::InDays(d) => write!(f, "In {d}d"),
        }
    }
}

/// Live count of upcoming meetings, refreshed on every store broadcast.
#[derive(Debug)]
pub struct MeetingCounter {
    count: Arc<AtomicUsize>,
    _subscription: Subscription,
}

impl MeetingCounter {
    #[must_use]
    pub fn attach(store: &EventStore) -> Self {
        let count = Arc::new(AtomicUsize::new(count_upcoming(&store.load())));
        let sink = Arc::clone(&count);
        let subscription = store.subscribe(move |change| {
            let upcoming = count_upcoming(&change.events);
            sink.store(upcoming, Ordering::Release);
            tracing::trace!(revision = change.revision, upcoming, "Meeting counter refreshed");
        });
        Self {
            count,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

fn count_upcoming(events: &[CalendarEvent]) -> usize {
    events.iter().filter(|event| is_upcoming(event)).count()
}
