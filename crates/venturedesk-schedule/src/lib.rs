//! Scheduling core of the venturedesk marketplace dashboard.
//!
//! Calendar events live in a single observable [`store::EventStore`]. The
//! availability manager and meeting negotiation build and edit events, the
//! calendar view adapter turns store contents into widget records, and
//! dashboard observers follow the store through its broadcast.

pub mod availability;
pub mod backend;
pub mod collab;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod negotiation;
pub mod persist;
pub mod recurrence;
pub mod seed;
pub mod store;
pub mod view;
