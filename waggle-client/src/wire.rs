//! Wire contract for the identity service.
//!
//! Every success body arrives wrapped as `{"data": <payload>}`; error bodies
//! follow RFC 9457 problem details where the service can produce them.
//! Missing `data`, or missing token fields on login/refresh, is a contract
//! violation surfaced as [`AuthError::InvalidResponse`] - never a silent
//! success.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use waggle_core::{AuthError, CredentialPair};

/// Signup endpoint path.
pub const SIGNUP_PATH: &str = "/api/v1/auth/signup";
/// Login endpoint path.
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
/// Refresh endpoint path.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
/// Whoami endpoint path.
pub const ME_PATH: &str = "/api/v1/members/me";

/// The `{"data": ...}` success envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Wrapped payload; absence is a contract violation.
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning an absent `data` into a contract error.
    pub fn into_data(self, operation: &str) -> Result<T, AuthError> {
        self.data.ok_or_else(|| {
            AuthError::invalid_response(format!("missing data payload in {operation} response"))
        })
    }
}

/// Signup request body.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    /// Email to register.
    pub email: &'a str,
    /// Password to register.
    pub password: &'a str,
}

/// Signup response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupResponse {
    /// Identifier assigned to the new account.
    pub id: i64,
    /// Email the account was registered with.
    pub email: String,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// Token payload returned by login and refresh.
///
/// The refresh endpoint omits `token_type`; it defaults to `"bearer"`.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token scheme, defaulting to `"bearer"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<TokenGrant> for CredentialPair {
    fn from(grant: TokenGrant) -> Self {
        CredentialPair::new(grant.access_token, grant.refresh_token)
            .with_token_type(grant.token_type)
    }
}

/// Refresh request body.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    /// The refresh token to trade in.
    pub refresh_token: &'a str,
}

/// Logout request body.
#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    /// The refresh token to invalidate remotely.
    pub refresh_token: &'a str,
}

/// RFC 9457 problem-details error body, extension members ignored.
#[derive(Debug, Deserialize)]
struct ProblemDetails {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Best human-readable reason for a rejected request.
///
/// Prefers the problem-details `detail`, then `title`, then the raw status
/// line when the body is not a parseable problem document.
pub fn rejection_detail(status: StatusCode, body: &str) -> String {
    if let Ok(problem) = serde_json::from_str::<ProblemDetails>(body) {
        if let Some(detail) = problem.detail.filter(|d| !d.is_empty()) {
            return detail;
        }
        if let Some(title) = problem.title.filter(|t| !t.is_empty()) {
            return title;
        }
    }
    format!("HTTP {status}")
}
