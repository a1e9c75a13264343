//! The authenticated user's profile.

use serde::{Deserialize, Serialize};

/// Profile data for the authenticated user, as reported by the identity
/// service's `whoami` endpoint.
///
/// Identities are fetched on demand and never persisted locally - they are
/// considered stale immediately after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable numeric identifier.
    pub id: i64,
    /// Email address the account was registered with.
    pub email: String,
    /// Role name assigned by the service (e.g. `"USER"`).
    pub role: String,
}
