//! Observable in-process store of calendar events.
//!
//! ## Summary
//! The store owns the only list of events for a session. Every mutation builds
//! a new list from the current one, swaps the shared reference under the write
//! lock, and broadcasts the change after the lock is released. Observers that
//! read the store while handling a change therefore always see the complete
//! new list. Writers are serialized through delivery, so changes reach
//! observers in revision order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tokio::sync::watch;

use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{CalendarEvent, EventId};
use crate::seed::mock_calendar_events;

/// Shared, immutable view of the event list at one revision.
pub type EventList = Arc<Vec<CalendarEvent>>;

/// What caused a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCause {
    /// State the store was opened with.
    Initial,
    Replaced,
    Appended(EventId),
    Extended { count: usize },
    Updated(EventId),
    Removed(EventId),
}

/// Payload delivered to every observer after a mutation.
#[derive(Debug, Clone)]
pub struct StoreChange {
    pub revision: u64,
    pub cause: ChangeCause,
    pub events: EventList,
}

type Callback = Arc<dyn Fn(&StoreChange) + Send + Sync>;
type Registry = Mutex<Vec<(u64, Callback)>>;

#[derive(Debug)]
struct State {
    events: EventList,
    revision: u64,
}

pub struct EventStore {
    state: RwLock<State>,
    subscribers: Arc<Registry>,
    next_subscriber: AtomicU64,
    watch: watch::Sender<StoreChange>,
    /// Held from the start of a mutation until its broadcast is delivered.
    delivery: Mutex<()>,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("EventStore")
            .field("events", &state.events.len())
            .field("revision", &state.revision)
            .finish_non_exhaustive()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::open(None)
    }
}

impl EventStore {
    /// ## Summary
    /// Opens a store for a session, seeding it from the mock dataset when no
    /// prior state is supplied.
    #[must_use]
    pub fn open(prior: Option<Vec<CalendarEvent>>) -> Self {
        let events = prior.unwrap_or_else(|| {
            tracing::debug!("No prior calendar state, seeding mock events");
            mock_calendar_events()
        });
        Self::from_events(events)
    }

    #[must_use]
    pub fn from_events(events: Vec<CalendarEvent>) -> Self {
        let events = Arc::new(events);
        let (watch, _) = watch::channel(StoreChange {
            revision: 0,
            cause: ChangeCause::Initial,
            events: Arc::clone(&events),
        });
        Self {
            state: RwLock::new(State {
                events,
                revision: 0,
            }),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber: AtomicU64::new(0),
            watch,
            delivery: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::from_events(Vec::new())
    }

    /// Current list. Cheap: clones the shared reference only.
    #[must_use]
    pub fn load(&self) -> EventList {
        Arc::clone(&self.read_state().events)
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_state().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<CalendarEvent> {
        self.read_state()
            .events
            .iter()
            .find(|event| &event.id == id)
            .cloned()
    }

    /// ## Summary
    /// Swaps the whole list.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Validation` if any event violates its time
    /// invariant, or `ScheduleError::Conflict` if ids repeat.
    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    pub fn replace(&self, events: Vec<CalendarEvent>) -> ScheduleResult<()> {
        for (idx, event) in events.iter().enumerate() {
            event.validate()?;
            if events[..idx].iter().any(|other| other.id == event.id) {
                return Err(ScheduleError::Conflict(format!(
                    "event id {} appears more than once",
                    event.id
                )));
            }
        }
        self.commit(|_| Ok((events, ChangeCause::Replaced, ())))
    }

    /// ## Summary
    /// Adds an event at the end of the list.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Conflict` if the id is already stored, or
    /// `ScheduleError::Validation` if the event is invalid.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type()))]
    pub fn append(&self, event: CalendarEvent) -> ScheduleResult<()> {
        event.validate()?;
        self.commit(|current| {
            if current.iter().any(|existing| existing.id == event.id) {
                tracing::warn!("Rejected duplicate event id");
                return Err(ScheduleError::Conflict(format!(
                    "event {} already exists",
                    event.id
                )));
            }
            let cause = ChangeCause::Appended(event.id.clone());
            let mut next = current.to_vec();
            next.push(event);
            Ok((next, cause, ()))
        })
    }

    /// ## Summary
    /// Adds several events in one mutation and one broadcast.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Conflict` if any id is already stored or repeats
    /// within `events`, or `ScheduleError::Validation` if an event is invalid.
    /// Nothing is stored on error.
    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    pub fn extend(&self, events: Vec<CalendarEvent>) -> ScheduleResult<()> {
        for event in &events {
            event.validate()?;
        }
        self.commit(|current| {
            let mut next = current.to_vec();
            for event in events {
                if next.iter().any(|existing| existing.id == event.id) {
                    return Err(ScheduleError::Conflict(format!(
                        "event {} already exists",
                        event.id
                    )));
                }
                next.push(event);
            }
            let count = next.len() - current.len();
            Ok((next, ChangeCause::Extended { count }, ()))
        })
    }

    /// ## Summary
    /// Applies `patch` to a copy of the event and stores the copy.
    ///
    /// The stored event is never mutated in place. A patch that changes the id
    /// or breaks the time invariant is rejected and nothing is stored.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` for an unknown id, any error returned
    /// by `patch`, `ScheduleError::InvariantViolation` if the id changed, or
    /// `ScheduleError::Validation` if the result is invalid.
    #[tracing::instrument(skip(self, patch), fields(event_id = %id))]
    pub fn update_by_id<F>(&self, id: &EventId, patch: F) -> ScheduleResult<CalendarEvent>
    where
        F: FnOnce(&mut CalendarEvent) -> ScheduleResult<()>,
    {
        self.commit(|current| {
            let Some(idx) = current.iter().position(|event| &event.id == id) else {
                tracing::warn!("Update target not found");
                return Err(ScheduleError::NotFound(id.clone()));
            };
            let mut updated = current[idx].clone();
            patch(&mut updated)?;
            if &updated.id != id {
                return Err(ScheduleError::InvariantViolation(
                    "event ids cannot change after creation",
                ));
            }
            updated.validate()?;

            let mut next = current.to_vec();
            next[idx] = updated.clone();
            Ok((next, ChangeCause::Updated(id.clone()), updated))
        })
    }

    /// ## Summary
    /// Removes an event and returns it.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` if no event has this id. Nothing is
    /// broadcast in that case.
    #[tracing::instrument(skip(self), fields(event_id = %id))]
    pub fn remove_by_id(&self, id: &EventId) -> ScheduleResult<CalendarEvent> {
        self.commit(|current| {
            let Some(idx) = current.iter().position(|event| &event.id == id) else {
                tracing::warn!("Remove target not found");
                return Err(ScheduleError::NotFound(id.clone()));
            };
            let mut next = current.to_vec();
            let removed = next.remove(idx);
            Ok((next, ChangeCause::Removed(id.clone()), removed))
        })
    }

    /// ## Summary
    /// Registers a callback invoked synchronously after every mutation.
    ///
    /// The callback may read the store but must not mutate it: mutations wait
    /// until every callback of the previous change has returned. Dropping the
    /// returned [`Subscription`] unregisters the callback.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreChange) + Send + Sync + 'static,
    {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        lock_registry(&self.subscribers).push((id, Arc::new(callback)));
        tracing::trace!(subscriber = id, "Store subscriber registered");
        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Receiver for asynchronous observers; always holds the latest change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<StoreChange> {
        self.watch.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.subscribers).len()
    }

    fn commit<T, F>(&self, op: F) -> ScheduleResult<T>
    where
        F: FnOnce(&[CalendarEvent]) -> ScheduleResult<(Vec<CalendarEvent>, ChangeCause, T)>,
    {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let (change, out) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let (next, cause, out) = op(&state.events)?;
            state.revision += 1;
            state.events = Arc::new(next);
            let change = StoreChange {
                revision: state.revision,
                cause,
                events: Arc::clone(&state.events),
            };
            (change, out)
        };

        tracing::debug!(
            revision = change.revision,
            cause = ?change.cause,
            count = change.events.len(),
            "Calendar events updated"
        );
        self.broadcast(&change);
        Ok(out)
    }

    fn broadcast(&self, change: &StoreChange) {
        self.watch.send_if_modified(|latest| {
            if change.revision > latest.revision {
                *latest = change.clone();
                true
            } else {
                false
            }
        });

        let callbacks: Vec<Callback> = lock_registry(&self.subscribers)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(change);
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_registry(registry: &Registry) -> std::sync::MutexGuard<'_, Vec<(u64, Callback)>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for a store callback. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Keeps the callback registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry).retain(|(id, _)| *id != self.id);
            tracing::trace!(subscriber = self.id, "Store subscriber removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::model::{EventKind, MeetingStatus};

    fn meeting(id: &str) -> ScheduleResult<CalendarEvent> {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .single()
            .unwrap_or_default();
        CalendarEvent::new(
            EventId::new(id),
            "Pitch review",
            start,
            start + TimeDelta::minutes(30),
            EventKind::Meeting {
                status: MeetingStatus::Pending,
            },
        )
    }

    #[test]
    fn open_without_prior_state_seeds_mock_data() {
        let store = EventStore::open(None);
        assert_eq!(store.len(), mock_calendar_events().len());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn open_with_prior_state_keeps_it() -> ScheduleResult<()> {
        let store = EventStore::open(Some(vec![meeting("m1")?]));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test_log::test]
    fn subscriber_sees_complete_list_inside_notification() -> ScheduleResult<()> {
        let store = Arc::new(EventStore::empty());
        let observed = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&store);
        let sink = Arc::clone(&observed);
        let _sub = store.subscribe(move |change| {
            let now = reader.load();
            let consistent = Arc::ptr_eq(&now, &change.events);
            lock_ok(&sink).push((change.revision, now.len(), consistent));
        });

        store.append(meeting("m1")?)?;
        store.append(meeting("m2")?)?;
        store.remove_by_id(&EventId::new("m1"))?;

        assert_eq!(
            *lock_ok(&observed),
            vec![(1, 1, true), (2, 2, true), (3, 1, true)]
        );
        Ok(())
    }

    #[test]
    fn failed_mutations_do_not_broadcast() -> ScheduleResult<()> {
        let store = EventStore::empty();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let missing = EventId::new("missing");
        assert!(matches!(
            store.remove_by_id(&missing),
            Err(ScheduleError::NotFound(_))
        ));
        assert!(matches!(
            store.update_by_id(&missing, |_| Ok(())),
            Err(ScheduleError::NotFound(_))
        ));

        store.append(meeting("m1")?)?;
        assert!(matches!(
            store.append(meeting("m1")?),
            Err(ScheduleError::Conflict(_))
        ));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.revision(), 1);
        Ok(())
    }

    #[test]
    fn update_works_on_a_copy() -> ScheduleResult<()> {
        let store = EventStore::from_events(vec![meeting("m1")?]);
        let before = store.load();

        let updated = store.update_by_id(&EventId::new("m1"), |event| {
            event.title = "Term sheet".to_string();
            Ok(())
        })?;

        assert_eq!(updated.title, "Term sheet");
        assert_eq!(before[0].title, "Pitch review");
        assert_eq!(store.load()[0].title, "Term sheet");
        Ok(())
    }

    #[test]
    fn update_cannot_change_id_or_break_times() -> ScheduleResult<()> {
        let store = EventStore::from_events(vec![meeting("m1")?]);
        let id = EventId::new("m1");

        let renamed = store.update_by_id(&id, |event| {
            event.id = EventId::new("other");
            Ok(())
        });
        assert!(matches!(renamed, Err(ScheduleError::InvariantViolation(_))));

        let inverted = store.update_by_id(&id, |event| {
            event.end = event.start;
            Ok(())
        });
        assert!(matches!(inverted, Err(ScheduleError::Validation(_))));

        assert_eq!(store.revision(), 0);
        Ok(())
    }

    #[test]
    fn extend_is_one_broadcast_and_all_or_nothing() -> ScheduleResult<()> {
        let store = EventStore::from_events(vec![meeting("m1")?]);
        let rx = store.watch();

        store.extend(vec![meeting("m2")?, meeting("m3")?])?;
        assert_eq!(store.len(), 3);
        assert_eq!(rx.borrow().cause, ChangeCause::Extended { count: 2 });

        let clash = store.extend(vec![meeting("m4")?, meeting("m1")?]);
        assert!(matches!(clash, Err(ScheduleError::Conflict(_))));
        assert_eq!(store.len(), 3);
        assert_eq!(store.revision(), 1);
        Ok(())
    }

    #[test]
    fn replace_rejects_duplicate_ids() -> ScheduleResult<()> {
        let store = EventStore::empty();
        let result = store.replace(vec![meeting("dup")?, meeting("dup")?]);
        assert!(matches!(result, Err(ScheduleError::Conflict(_))));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = EventStore::empty();
        let sub = store.subscribe(|_| {});
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);

        store.subscribe(|_| {}).detach();
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn watch_tracks_latest_change() -> ScheduleResult<()> {
        let store = EventStore::empty();
        let rx = store.watch();
        assert_eq!(rx.borrow().cause, ChangeCause::Initial);

        store.append(meeting("m1")?)?;
        let latest = rx.borrow();
        assert_eq!(latest.revision, 1);
        assert_eq!(latest.cause, ChangeCause::Appended(EventId::new("m1")));
        Ok(())
    }

    #[test]
    fn concurrent_writers_publish_in_revision_order() {
        let store = Arc::new(EventStore::empty());
        let rx = store.watch();
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        let _sub = store.subscribe(move |change| lock_ok(&sink).push(change.revision));

        std::thread::scope(|scope| {
            for writer in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for n in 0..20 {
                        let appended = meeting(&format!("w{writer}-{n}"))
                            .and_then(|event| store.append(event));
                        assert!(appended.is_ok(), "{appended:?}");
                    }
                });
            }
        });

        assert_eq!(store.revision(), 160);
        assert_eq!(store.len(), 160);
        assert_eq!(rx.borrow().revision, store.revision());
        assert_eq!(*lock_ok(&delivered), (1..=160).collect::<Vec<u64>>());
    }

    fn lock_ok<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
