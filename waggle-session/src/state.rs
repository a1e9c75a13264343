//! Session state snapshots.

use waggle_core::Identity;

/// Coarse phase of the session lifecycle, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// `init` has not run yet.
    Uninitialized,
    /// `init` is executing.
    Loading,
    /// A verified identity is present.
    Authenticated,
    /// No session; the caller must treat the user as logged out regardless
    /// of what credential storage holds.
    Unauthenticated,
}

/// Immutable snapshot of the session's observable state.
///
/// Only the [`Session`](crate::Session) writes these; observers receive
/// clones through the watch channel and can never mutate shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The authenticated user's profile, when verified.
    pub identity: Option<Identity>,
    /// True only while `init` is executing.
    pub loading: bool,
    /// Human-readable message from the most recent failure.
    pub error: Option<String>,
    /// True once `init` has completed at least once.
    pub initialized: bool,
}

impl SessionState {
    /// Derive the lifecycle phase from the snapshot fields.
    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Loading
        } else if self.identity.is_some() {
            SessionStatus::Authenticated
        } else if self.initialized {
            SessionStatus::Unauthenticated
        } else {
            SessionStatus::Uninitialized
        }
    }

    /// True when a verified identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
