//! Identity service configuration.

use reqwest::Client;
use std::time::Duration;

/// Default base URL for a locally running identity service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration for reaching the identity service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the identity service (no trailing slash required).
    pub base_url: String,
    /// Request timeout applied to every call.
    pub timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Create a config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from environment variables.
    ///
    /// Looks for:
    /// - `WAGGLE_BASE_URL`
    /// - `WAGGLE_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("WAGGLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("WAGGLE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs);
        Self { base_url, timeout }
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build an HTTP client with this config.
    pub fn build_client(&self) -> Client {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slashes() {
        let config = ServiceConfig::new("http://localhost:8000/");
        assert_eq!(
            config.url("/api/v1/auth/login"),
            "http://localhost:8000/api/v1/auth/login"
        );
        assert_eq!(
            config.url("api/v1/members/me"),
            "http://localhost:8000/api/v1/members/me"
        );
    }

    #[test]
    fn default_points_at_local_service() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.timeout.is_none());
    }
}
