//! Shared configuration, errors and vocabulary for the venturedesk workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
