//! The credential pair backing a session.

use serde::{Deserialize, Serialize};
use std::fmt;

fn default_token_type() -> String {
    "bearer".to_string()
}

/// An access + refresh token pair issued by the identity service.
///
/// The pair is opaque bearer material: it is never parsed or inspected, and
/// it is always replaced wholesale - there is no way to update one half
/// without the other. `Debug` output redacts the token bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived access token, sent on every authenticated request.
    pub access: String,
    /// Long-lived refresh token, used solely to obtain a new access token.
    pub refresh: String,
    /// Token scheme reported by the service (normally `"bearer"`).
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl CredentialPair {
    /// Create a pair with the default `"bearer"` token type.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
            token_type: default_token_type(),
        }
    }

    /// Override the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}
