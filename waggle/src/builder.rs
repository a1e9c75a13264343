//! One-call wiring of store, client, and session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use waggle_client::{IdentityClient, ServiceConfig};
use waggle_core::{FileCredentialStore, MemoryCredentialStore, SharedStore};
use waggle_session::Session;

/// Builder assembling a [`Session`] from its parts.
///
/// The credential store defaults to in-memory; point it at a file (or any
/// custom [`CredentialStore`](waggle_core::CredentialStore)) for sessions
/// that survive a restart.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    config: ServiceConfig,
    store: Option<SharedStore>,
}

impl SessionBuilder {
    /// Start a builder pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ServiceConfig::new(base_url),
            store: None,
        }
    }

    /// Start a builder from `WAGGLE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            config: ServiceConfig::from_env(),
            store: None,
        }
    }

    /// Replace the whole service configuration.
    #[must_use]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Persist credentials to a JSON file at `path`.
    #[must_use]
    pub fn file_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = Some(Arc::new(FileCredentialStore::new(path)));
        self
    }

    /// Keep credentials in process memory only.
    #[must_use]
    pub fn memory_store(mut self) -> Self {
        self.store = Some(Arc::new(MemoryCredentialStore::new()));
        self
    }

    /// Use a custom credential store.
    #[must_use]
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Wire everything together.
    pub fn build(self) -> Session {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let api = IdentityClient::new(self.config, Arc::clone(&store));
        Session::new(api, store)
    }
}
