//! Wiring of the scheduling library into a runnable session.

pub mod session;
