//! Calendar data model.

pub mod attendee;
pub mod event;
pub mod form;
pub mod request;
pub mod slot;
pub mod time;

pub use attendee::{Attendee, AttendeeStatus};
pub use event::{
    CalendarEvent, Decision, EventId, EventKind, EventType, ExtendedProps, MeetingStatus,
};
pub use form::{AvailabilityForm, FormRecurrence, MeetingForm};
pub use request::{MeetingRequest, RequestStatus};
pub use slot::{AvailabilitySlot, SlotRecurrence};
pub use time::TimeOfDay;
