//! Error types for waggle.
//!
//! [`AuthError`] is the taxonomy every public operation returns.
//! Authorization failures on ordinary requests are recovered locally at most
//! once by the request pipeline; everything else propagates unchanged to the
//! session, which surfaces the `Display` string without further
//! classification.

use thiserror::Error;

/// Failures of the credential persistence medium.
///
/// Storage failures are fatal to the calling operation and always
/// propagate - they are never swallowed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage medium could not be read or written.
    #[error("credential storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The storage medium holds data that does not parse as credentials.
    #[error("credential storage holds invalid data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The main error type for waggle operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure: no usable response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The identity service rejected a login attempt.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The identity service rejected a signup attempt.
    #[error("signup rejected: {0}")]
    SignupRejected(String),

    /// The refresh credential is missing, invalid, or expired.
    #[error("session refresh rejected: {0}")]
    RefreshRejected(String),

    /// The access credential was missing or rejected.
    #[error("not authorized")]
    Unauthorized,

    /// The identity service violated its response contract.
    #[error("unexpected response from identity service: {0}")]
    InvalidResponse(String),

    /// Credential persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a signup rejection error.
    pub fn signup_rejected(msg: impl Into<String>) -> Self {
        Self::SignupRejected(msg.into())
    }

    /// Create a refresh rejection error.
    pub fn refresh_rejected(msg: impl Into<String>) -> Self {
        Self::RefreshRejected(msg.into())
    }

    /// Create a contract-violation error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True when this error means the access credential was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type alias using [`AuthError`].
pub type AuthResult<T> = Result<T, AuthError>;
