//! Collaborators the scheduling components talk to: user feedback, delete
//! confirmation and the current session identity.

use std::sync::{Mutex, PoisonError};

use venturedesk_core::types::UserRole;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast-style feedback surface.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notice = %message, "success");
    }

    fn error(&self, message: &str) {
        tracing::warn!(notice = %message, "error");
    }
}

/// Keeps every notice for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }
}

/// Interactive yes/no prompt guarding destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// The signed-in user as seen by the scheduling components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<SessionUser>;
}

/// Fixed identity, or none when signed out.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<SessionUser>);

impl StaticIdentity {
    #[must_use]
    pub const fn signed_in(user: SessionUser) -> Self {
        Self(Some(user))
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<SessionUser> {
        self.0.clone()
    }
}

impl From<&venturedesk_core::config::SessionConfig> for SessionUser {
    fn from(config: &venturedesk_core::config::SessionConfig) -> Self {
        Self {
            id: config.user_id.clone(),
            name: config.name.clone(),
            email: config.email.clone(),
            role: config.role,
        }
    }
}

/// Outcome of a confirmed-delete flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion<T> {
    Removed(T),
    /// The user declined the confirmation prompt.
    Kept,
}

impl<T> Deletion<T> {
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }
}
