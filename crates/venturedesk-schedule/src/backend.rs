//! Asynchronous boundary in front of the scheduling components.
//!
//! ## Summary
//! Calls that would reach a server wait on a [`Latency`] before running the
//! synchronous operation. The wait happens first, so a caller that drops the
//! future early leaves the store untouched, and an operation that has started
//! always runs to completion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::availability::AvailabilityManager;
use crate::error::ScheduleResult;
use crate::model::{AvailabilityForm, CalendarEvent, Decision, EventId, MeetingForm, MeetingRequest};
use crate::negotiation::MeetingNegotiation;

/// Delay applied before every backend call.
pub trait Latency: Send + Sync {
    fn settle(&self) -> impl Future<Output = ()> + Send;
}

/// Fixed delay on the tokio timer.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedLatency(pub Duration);

impl Latency for SimulatedLatency {
    async fn settle(&self) {
        tracing::trace!(delay_ms = self.0.as_millis(), "Simulating backend latency");
        tokio::time::sleep(self.0).await;
    }
}

/// Resolves without waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Latency for Immediate {
    async fn settle(&self) {}
}

#[derive(Debug)]
pub struct SimulatedBackend<L> {
    negotiation: Arc<MeetingNegotiation>,
    availability: Arc<AvailabilityManager>,
    latency: L,
}

impl<L: Latency> SimulatedBackend<L> {
    #[must_use]
    pub const fn new(
        negotiation: Arc<MeetingNegotiation>,
        availability: Arc<AvailabilityManager>,
        latency: L,
    ) -> Self {
        Self {
            negotiation,
            availability,
            latency,
        }
    }

    /// ## Errors
    /// See [`MeetingNegotiation::request_meeting`].
    pub async fn request_meeting(
        &self,
        date: DateTime<Utc>,
        form: &MeetingForm,
    ) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.negotiation.request_meeting(date, form)
    }

    /// ## Errors
    /// See [`MeetingNegotiation::update_meeting`].
    pub async fn update_meeting(
        &self,
        id: &EventId,
        date: DateTime<Utc>,
        form: &MeetingForm,
    ) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.negotiation.update_meeting(id, date, form)
    }

    /// ## Errors
    /// See [`MeetingNegotiation::respond`].
    pub async fn respond(&self, id: &EventId, decision: Decision) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.negotiation.respond(id, decision)
    }

    /// ## Errors
    /// See [`MeetingNegotiation::import_request`].
    pub async fn import_request(&self, request: &MeetingRequest) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.negotiation.import_request(request)
    }

    /// ## Errors
    /// See [`AvailabilityManager::create_availability`].
    pub async fn create_availability(
        &self,
        date: DateTime<Utc>,
        form: &AvailabilityForm,
    ) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.availability.create_availability(date, form)
    }

    /// ## Errors
    /// See [`AvailabilityManager::update_availability`].
    pub async fn update_availability(
        &self,
        id: &EventId,
        form: &AvailabilityForm,
    ) -> ScheduleResult<CalendarEvent> {
        self.latency.settle().await;
        self.availability.update_availability(id, form)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tokio::time::Instant;
    use venturedesk_core::types::UserRole;

    use super::*;
    use crate::collab::{RecordingNotifier, SessionUser, StaticIdentity};
    use crate::model::MeetingStatus;
    use crate::store::EventStore;

    fn backend<L: Latency>(latency: L) -> (SimulatedBackend<L>, Arc<EventStore>) {
        let store = Arc::new(EventStore::empty());
        let notifier = Arc::new(RecordingNotifier::default());
        let identity = StaticIdentity::signed_in(SessionUser {
            id: "e1".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah@techwave.io".to_string(),
            role: UserRole::Entrepreneur,
        });
        let negotiation = Arc::new(MeetingNegotiation::new(
            Arc::clone(&store),
            notifier.clone(),
            Arc::new(identity),
        ));
        let availability = Arc::new(AvailabilityManager::new(Arc::clone(&store), notifier));
        (SimulatedBackend::new(negotiation, availability, latency), store)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn form() -> MeetingForm {
        MeetingForm {
            title: "Due diligence".to_string(),
            ..MeetingForm::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_delays_then_applies() -> ScheduleResult<()> {
        let (backend, store) = backend(SimulatedLatency(Duration::from_millis(1000)));
        let started = Instant::now();

        let meeting = backend.request_meeting(at(), &form()).await?;
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(store.len(), 1);

        let answered = backend.respond(&meeting.id, Decision::Accepted).await?;
        assert_eq!(answered.status(), Some(MeetingStatus::Confirmed));
        assert!(started.elapsed() >= Duration::from_millis(2000));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_does_not_advance_time() -> ScheduleResult<()> {
        let (backend, store) = backend(Immediate);
        let started = Instant::now();

        backend
            .create_availability(at(), &AvailabilityForm::default())
            .await?;
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_call_never_touches_store() {
        let (backend, store) = backend(SimulatedLatency(Duration::from_secs(5)));
        let form = form();
        let call = backend.request_meeting(at(), &form);

        let outcome = tokio::time::timeout(Duration::from_secs(1), call).await;
        assert!(outcome.is_err());
        assert!(store.is_empty());
    }
}
