//! In-memory credential store.

use crate::credentials::CredentialPair;
use crate::errors::StorageError;
use crate::store::CredentialStore;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Credential store backed by process memory.
///
/// Nothing survives a restart; useful for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<CredentialPair>, StorageError> {
        Ok(self.inner.lock().clone())
    }

    async fn set(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        *self.inner.lock() = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.inner.lock() = None;
        Ok(())
    }
}
