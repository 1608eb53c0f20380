//! Integration tests for the scheduling components working against one shared
//! event store.

mod flows;
mod helpers;
mod properties;
