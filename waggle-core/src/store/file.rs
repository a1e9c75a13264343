//! On-disk credential store.
//!
//! Persists the credential pair as pretty-printed JSON at a caller-supplied
//! path with restricted permissions (0600 on Unix). An absent file reads as
//! "no session"; a file that fails to parse is a [`StorageError`].

use crate::credentials::CredentialPair;
use crate::errors::StorageError;
use crate::store::CredentialStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Credential store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store persisting to `path`. The file and its parent
    /// directories are created lazily on the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
    }

    #[cfg(not(unix))]
    async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<CredentialPair>, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let pair = serde_json::from_str(&contents)?;
        Ok(Some(pair))
    }

    async fn set(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(pair)?;
        fs::write(&self.path, contents).await?;
        Self::restrict_permissions(&self.path).await?;
        debug!(path = %self.path.display(), "persisted credential pair");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed stored credentials");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("waggle-store-{}-{}.json", std::process::id(), name))
    }

    #[tokio::test]
    async fn missing_file_reads_as_no_session() {
        let store = FileCredentialStore::new(scratch_path("missing"));
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let path = scratch_path("round-trip");
        let store = FileCredentialStore::new(&path);
        let pair = CredentialPair::new("access-bytes", "refresh-bytes");

        store.set(&pair).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(pair));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = FileCredentialStore::new(scratch_path("clear-twice"));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let path = scratch_path("corrupt");
        fs::write(&path, "not json at all").await.unwrap();

        let store = FileCredentialStore::new(&path);
        let err = store.get().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));

        fs::remove_file(&path).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = scratch_path("permissions");
        let store = FileCredentialStore::new(&path);
        store
            .set(&CredentialPair::new("access", "refresh"))
            .await
            .unwrap();

        let mode = fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        fs::remove_file(&path).await.unwrap();
    }
}
