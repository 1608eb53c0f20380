//! Adapter between the event store and a month/week/day calendar widget.
//!
//! ## Summary
//! The widget receives the whole event list on every render and reports user
//! interaction back as callbacks. Callbacks are translated into
//! [`ViewAction`]s; the adapter itself never mutates the store.

use std::sync::Arc;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{CalendarEvent, EventId, EventKind, EventType, ExtendedProps, MeetingStatus};
use crate::store::EventStore;

/// Grid layout shown by the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarViewKind {
    #[default]
    #[serde(rename = "dayGridMonth")]
    Month,
    #[serde(rename = "timeGridWeek")]
    Week,
    #[serde(rename = "timeGridDay")]
    Day,
}

impl CalendarViewKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "dayGridMonth",
            Self::Week => "timeGridWeek",
            Self::Day => "timeGridDay",
        }
    }
}

impl std::fmt::Display for CalendarViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CalendarViewKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dayGridMonth" => Ok(Self::Month),
            "timeGridWeek" => Ok(Self::Week),
            "timeGridDay" => Ok(Self::Day),
            other => Err(ScheduleError::Validation(format!(
                "unknown calendar view '{other}'"
            ))),
        }
    }
}

/// Styling class handed to the widget alongside the raw color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTone {
    Green,
    Blue,
    Yellow,
    Red,
    Gray,
}

impl EventTone {
    #[must_use]
    pub const fn for_kind(kind: EventKind) -> Self {
        match kind {
            EventKind::Availability => Self::Green,
            EventKind::Meeting { status } => match status {
                MeetingStatus::Confirmed => Self::Blue,
                MeetingStatus::Pending => Self::Yellow,
                MeetingStatus::Declined => Self::Red,
                MeetingStatus::Cancelled => Self::Gray,
            },
            EventKind::Blocked => Self::Gray,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProps {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MeetingStatus>,
    pub tone: EventTone,
    #[serde(flatten)]
    pub details: ExtendedProps,
}

/// One record in the format the calendar widget consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color: String,
    pub all_day: bool,
    pub extended_props: WidgetProps,
}

impl From<&CalendarEvent> for WidgetEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            color: event.color.clone(),
            all_day: event.all_day,
            extended_props: WidgetProps {
                event_type: event.event_type(),
                status: event.status(),
                tone: EventTone::for_kind(event.kind),
                details: event.extended_props.clone(),
            },
        }
    }
}

/// What the surrounding page should do in response to a widget callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Open the meeting form for a new meeting at `date`.
    OpenMeetingForm { date: DateTime<Utc> },
    /// Open the availability form for a new window at `date`.
    OpenAvailabilityForm { date: DateTime<Utc> },
    EditAvailability(CalendarEvent),
    ViewMeeting(CalendarEvent),
    /// Clicked event has no editor.
    Inert,
}

#[derive(Debug)]
pub struct CalendarView {
    store: Arc<EventStore>,
    kind: CalendarViewKind,
    cursor: NaiveDate,
}

impl CalendarView {
    /// Month view positioned on `cursor`.
    #[must_use]
    pub fn new(store: Arc<EventStore>, cursor: NaiveDate) -> Self {
        Self {
            store,
            kind: CalendarViewKind::Month,
            cursor,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CalendarViewKind {
        self.kind
    }

    #[must_use]
    pub const fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    /// Every stored event in widget form, in store order.
    #[must_use]
    pub fn render(&self) -> Vec<WidgetEvent> {
        let events = self.store.load();
        tracing::trace!(count = events.len(), view = %self.kind, "Rendering calendar");
        events.iter().map(WidgetEvent::from).collect()
    }

    /// A selected range opens a new meeting seeded with the range start.
    #[must_use]
    pub fn on_date_range_select(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ViewAction {
        tracing::debug!(%start, %end, view = %self.kind, "Date range selected");
        ViewAction::OpenMeetingForm { date: start }
    }

    /// ## Summary
    /// Routes a click on an existing event to its editor.
    ///
    /// ## Errors
    /// Returns `ScheduleError::NotFound` if the event is no longer stored.
    #[tracing::instrument(skip(self), fields(event_id = %id))]
    pub fn on_event_click(&self, id: &EventId) -> ScheduleResult<ViewAction> {
        let event = self.store.get(id).ok_or_else(|| {
            tracing::warn!("Clicked event is gone");
            ScheduleError::NotFound(id.clone())
        })?;
        Ok(match event.kind {
            EventKind::Availability => ViewAction::EditAvailability(event),
            EventKind::Meeting { .. } => ViewAction::ViewMeeting(event),
            EventKind::Blocked => ViewAction::Inert,
        })
    }

    /// Toolbar "add availability" button; the new window starts at `now`.
    #[must_use]
    pub fn add_availability(&self, now: DateTime<Utc>) -> ViewAction {
        tracing::debug!(%now, view = %self.kind, "Add availability requested");
        ViewAction::OpenAvailabilityForm { date: now }
    }

    pub fn on_view_change(&mut self, kind: CalendarViewKind) {
        tracing::debug!(from = %self.kind, to = %kind, "Calendar view changed");
        self.kind = kind;
    }

    pub fn prev(&mut self) {
        self.cursor = match self.kind {
            CalendarViewKind::Month => self
                .cursor
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.cursor),
            CalendarViewKind::Week => self
                .cursor
                .checked_sub_days(Days::new(7))
                .unwrap_or(self.cursor),
            CalendarViewKind::Day => self
                .cursor
                .checked_sub_days(Days::new(1))
                .unwrap_or(self.cursor),
        };
    }

    pub fn next(&mut self) {
        self.cursor = match self.kind {
            CalendarViewKind::Month => self
                .cursor
                .checked_add_months(Months::new(1))
                .unwrap_or(self.cursor),
            CalendarViewKind::Week => self
                .cursor
                .checked_add_days(Days::new(7))
                .unwrap_or(self.cursor),
            CalendarViewKind::Day => self
                .cursor
                .checked_add_days(Days::new(1))
                .unwrap_or(self.cursor),
        };
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.cursor = today;
    }

    /// Toolbar heading, e.g. `January 2024`.
    #[must_use]
    pub fn title(&self) -> String {
        self.cursor.format("%B %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn view() -> CalendarView {
        CalendarView::new(Arc::new(EventStore::open(None)), date(2024, 1, 31))
    }

    #[test]
    fn render_passes_every_event_with_tone() {
        let rendered = view().render();
        let tones: Vec<EventTone> = rendered.iter().map(|e| e.extended_props.tone).collect();
        assert_eq!(tones, vec![EventTone::Green, EventTone::Blue, EventTone::Yellow]);
    }

    #[test]
    fn widget_json_carries_type_and_status_in_extended_props() -> ScheduleResult<()> {
        let rendered = view().render();
        let json = serde_json::to_value(&rendered)?;

        assert_eq!(json[0]["extendedProps"]["type"], "availability");
        assert!(json[0]["extendedProps"].get("status").is_none());
        assert_eq!(json[1]["extendedProps"]["status"], "confirmed");
        assert_eq!(json[1]["extendedProps"]["meetingLink"], "https://zoom.us/j/123456");
        assert_eq!(json[1]["allDay"], false);
        Ok(())
    }

    #[test]
    fn clicks_route_by_kind() -> ScheduleResult<()> {
        let view = view();
        assert!(matches!(
            view.on_event_click(&EventId::new("1"))?,
            ViewAction::EditAvailability(_)
        ));
        assert!(matches!(
            view.on_event_click(&EventId::new("2"))?,
            ViewAction::ViewMeeting(_)
        ));
        assert!(matches!(
            view.on_event_click(&EventId::new("gone")),
            Err(ScheduleError::NotFound(_))
        ));

        let start = Utc.with_ymd_and_hms(2024, 1, 4, 8, 0, 0).single().unwrap_or_default();
        view.store.append(CalendarEvent::new(
            EventId::new("focus"),
            "Focus time",
            start,
            start + TimeDelta::hours(2),
            EventKind::Blocked,
        )?)?;
        assert_eq!(view.on_event_click(&EventId::new("focus"))?, ViewAction::Inert);
        assert_eq!(view.render()[3].extended_props.tone, EventTone::Gray);
        Ok(())
    }

    #[test]
    fn range_select_opens_meeting_form_at_start() {
        let start = Utc.with_ymd_and_hms(2024, 1, 9, 10, 0, 0).single().unwrap_or_default();
        let action = view().on_date_range_select(start, start + TimeDelta::hours(1));
        assert_eq!(action, ViewAction::OpenMeetingForm { date: start });
    }

    #[test]
    fn navigation_follows_view_and_leaves_store_alone() {
        let mut view = view();
        let revision = view.store.revision();

        view.next();
        assert_eq!(view.cursor(), date(2024, 2, 29));
        assert_eq!(view.title(), "February 2024");

        view.on_view_change(CalendarViewKind::Week);
        view.prev();
        assert_eq!(view.cursor(), date(2024, 2, 22));

        view.on_view_change(CalendarViewKind::Day);
        view.next();
        assert_eq!(view.cursor(), date(2024, 2, 23));

        view.today(date(2024, 1, 1));
        assert_eq!(view.title(), "January 2024");
        assert_eq!(view.store.revision(), revision);
    }

    #[test]
    fn navigation_stops_at_calendar_bounds() {
        let mut view = CalendarView::new(Arc::new(EventStore::empty()), NaiveDate::MAX);
        for kind in [CalendarViewKind::Month, CalendarViewKind::Week, CalendarViewKind::Day] {
            view.on_view_change(kind);
            view.next();
            assert_eq!(view.cursor(), NaiveDate::MAX);
        }

        view.today(NaiveDate::MIN);
        for kind in [CalendarViewKind::Month, CalendarViewKind::Week, CalendarViewKind::Day] {
            view.on_view_change(kind);
            view.prev();
            assert_eq!(view.cursor(), NaiveDate::MIN);
        }
    }

    #[test]
    fn view_names_round_trip_through_text() -> ScheduleResult<()> {
        for kind in [CalendarViewKind::Month, CalendarViewKind::Week, CalendarViewKind::Day] {
            assert_eq!(kind.as_str().parse::<CalendarViewKind>()?, kind);
        }
        assert!("listWeek".parse::<CalendarViewKind>().is_err());
        Ok(())
    }
}
