//! Durable credential persistence.
//!
//! A [`CredentialStore`] is plain key/value persistence for the current
//! credential pair: `get`, `set`, `clear`, no business logic and no network
//! calls. The store is the only owner of credential bytes; the request
//! pipeline reads them and the session/refresh paths are the only writers.

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::credentials::CredentialPair;
use crate::errors::StorageError;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable storage for the session's credential pair.
///
/// Implementations must survive process restarts where their medium allows
/// it; storage failures propagate to the caller, never swallowed.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Read the stored pair, if any.
    async fn get(&self) -> Result<Option<CredentialPair>, StorageError>;

    /// Replace the stored pair wholesale.
    async fn set(&self, pair: &CredentialPair) -> Result<(), StorageError>;

    /// Remove any stored pair.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Shared handle to a credential store.
pub type SharedStore = Arc<dyn CredentialStore>;
