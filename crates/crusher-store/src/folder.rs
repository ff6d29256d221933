use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crusher_crypto::generate_uid;
use tokio::fs;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RemoveOutcome, StoreAdapter, WriteReceipt};

/// Folder-based document store: one file per key under a root folder.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader sees either the old document or the new one. Expiry hints are
/// ignored; lazy expiry in the engine still applies.
#[derive(Debug, Clone)]
pub struct FolderStore {
    root: PathBuf,
}

impl FolderStore {
    /// Open a store rooted at `root`, creating the folder if needed.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        if root.as_os_str().is_empty() {
            return Err(StoreError::Configuration(
                "folder store root must not be empty".into(),
            ));
        }
        fs::create_dir_all(&root).await?;
        let meta = fs::metadata(&root).await?;
        if !meta.is_dir() {
            return Err(StoreError::Configuration(format!(
                "folder store root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every key currently stored, sorted.
    pub async fn list_keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let invalid = |reason: &str| StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if key.starts_with('.') {
            return Err(invalid("keys may not start with '.'"));
        }
        if key.contains(['/', '\\', '\0']) {
            return Err(invalid("keys may not contain path separators"));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StoreAdapter for FolderStore {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(
        &self,
        key: &str,
        value: &str,
        _expire_seconds: Option<u64>,
        _prop_key: Option<&str>,
    ) -> StoreResult<WriteReceipt> {
        let path = self.path_for(key)?;
        let staging = self.root.join(format!(".{key}.{}", generate_uid(8)));
        fs::write(&staging, value.as_bytes()).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!(key, bytes = value.len(), "folder store write");
        Ok(WriteReceipt::new(value.len()))
    }

    async fn remove(&self, key: &str) -> StoreResult<RemoveOutcome> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoveOutcome::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
