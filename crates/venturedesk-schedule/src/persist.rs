//! JSON snapshots of the event store.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::model::CalendarEvent;
use crate::store::EventStore;

/// Current snapshot layout.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub events: Vec<CalendarEvent>,
}

impl Snapshot {
    #[must_use]
    pub fn new(events: Vec<CalendarEvent>, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            events,
        }
    }

    /// ## Errors
    /// Returns `ScheduleError::Serialization` if encoding fails.
    pub fn to_json(&self) -> ScheduleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// ## Summary
    /// Parses a snapshot and checks its version.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Serialization` for malformed JSON and
    /// `ScheduleError::Validation` for an unsupported version.
    pub fn from_json(json: &str) -> ScheduleResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ScheduleError::Validation(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// ## Summary
    /// Writes the snapshot to a temporary file next to `path` and renames it
    /// over `path`, so an interrupted save leaves the previous file intact.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Io` if the file cannot be written or moved
    /// into place.
    #[tracing::instrument(skip(self), fields(path = %path.display(), count = self.events.len()))]
    pub fn save_to(&self, path: &Path) -> ScheduleResult<()> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(json.as_bytes())?;
        staged.as_file().sync_all()?;
        staged
            .persist(path)
            .map_err(|err| ScheduleError::Io(err.error))?;
        tracing::debug!("Snapshot saved");
        Ok(())
    }

    /// ## Summary
    /// Reads a snapshot file. A missing file yields `Ok(None)`.
    ///
    /// ## Errors
    /// Returns `ScheduleError::Io` for other read failures and the errors of
    /// [`Snapshot::from_json`].
    #[tracing::instrument(fields(path = %path.display()))]
    pub fn load_from(path: &Path) -> ScheduleResult<Option<Self>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No snapshot on disk");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let snapshot = Self::from_json(&json)?;
        tracing::debug!(count = snapshot.events.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }
}

impl EventStore {
    /// Current list stamped with `saved_at`.
    #[must_use]
    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> Snapshot {
        Snapshot::new(self.load().to_vec(), saved_at)
    }

    /// ## Summary
    /// Replaces the stored list with the snapshot's events. Broadcasts a
    /// `Replaced` change.
    ///
    /// ## Errors
    /// Same as [`EventStore::replace`].
    pub fn restore(&self, snapshot: Snapshot) -> ScheduleResult<()> {
        self.replace(snapshot.events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::ChangeCause;

    fn saved_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 7, 18, 30, 0)
            .single()
            .unwrap_or_default()
    }

    #[test_log::test]
    fn file_round_trip_reproduces_events() -> ScheduleResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.json");
        let store = EventStore::open(None);

        store.snapshot(saved_at()).save_to(&path)?;
        let loaded = Snapshot::load_from(&path)?;

        let restored = EventStore::empty();
        let rx = restored.watch();
        if let Some(snapshot) = loaded {
            assert_eq!(snapshot.saved_at, saved_at());
            restored.restore(snapshot)?;
        }
        assert_eq!(*restored.load(), *store.load());
        assert_eq!(rx.borrow().cause, ChangeCause::Replaced);
        Ok(())
    }

    #[test]
    fn save_replaces_existing_file_whole() -> ScheduleResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.json");
        EventStore::open(None).snapshot(saved_at()).save_to(&path)?;

        EventStore::empty().snapshot(saved_at()).save_to(&path)?;

        let loaded = Snapshot::load_from(&path)?.map(|snapshot| snapshot.events.len());
        assert_eq!(loaded, Some(0));
        let names: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<_, _>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("events.json")]);
        Ok(())
    }

    #[test]
    fn save_into_missing_directory_fails() -> ScheduleResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("absent").join("events.json");
        let result = EventStore::empty().snapshot(saved_at()).save_to(&path);
        assert!(matches!(result, Err(ScheduleError::Io(_))));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn missing_file_is_none() -> ScheduleResult<()> {
        let dir = tempfile::tempdir()?;
        assert!(Snapshot::load_from(&dir.path().join("absent.json"))?.is_none());
        Ok(())
    }

    #[test]
    fn unknown_version_is_rejected() -> ScheduleResult<()> {
        let mut snapshot = EventStore::empty().snapshot(saved_at());
        snapshot.version = 99;
        let json = snapshot.to_json()?;
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(ScheduleError::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn json_keeps_widget_field_names() -> ScheduleResult<()> {
        let json = EventStore::open(None).snapshot(saved_at()).to_json()?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert!(value.get("savedAt").is_some());
        assert_eq!(value["events"][1]["extendedProps"]["meetingType"], "video");
        Ok(())
    }
}
