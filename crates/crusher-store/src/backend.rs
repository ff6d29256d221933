use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::serialized::SerializedStore;
use crate::traits::StoreAdapter;

/// The backend families crusher is deployed against.
///
/// Each family has a different per-record ceiling; these are the defaults
/// used when a deployment does not set its own chunk size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Cloud object storage (bucket + object name).
    ObjectStorage,
    /// Repository contents on a version-controlled file host.
    FileHost,
    /// Folder-based document store.
    FolderDocuments,
    /// Key-value cache.
    KeyValueCache,
}

impl BackendKind {
    /// Default maximum record size in bytes.
    pub fn default_chunk_size(self) -> usize {
        match self {
            Self::ObjectStorage => 4_000_000,
            Self::FileHost => 500_000,
            Self::FolderDocuments => 4_000_000,
            // the service advertises 1MB values but rejects anything much over 400k
            Self::KeyValueCache => 400_000,
        }
    }

    /// Whether the adapter keeps the namespace itself (folder or path),
    /// leaving the engine prefix empty.
    pub fn owns_namespace(self) -> bool {
        !matches!(self, Self::KeyValueCache)
    }

    /// Whether concurrent requests must be queued inside the adapter.
    pub fn requires_serialized_access(self) -> bool {
        matches!(self, Self::FileHost)
    }

    /// Hand `store` to the engine, queued behind a [`SerializedStore`] when
    /// this backend family rejects concurrent requests.
    pub fn adapter<S: StoreAdapter + 'static>(self, store: S) -> Arc<dyn StoreAdapter> {
        if self.requires_serialized_access() {
            Arc::new(SerializedStore::new(store))
        } else {
            Arc::new(store)
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ObjectStorage => "object-storage",
            Self::FileHost => "file-host",
            Self::FolderDocuments => "folder-documents",
            Self::KeyValueCache => "key-value-cache",
        };
        f.write_str(name)
    }
}

/// Normalise a folder-style namespace prefix.
///
/// The result starts with at most one `/` and ends with exactly one. Runs of
/// `/` inside the prefix are kept as given. An empty prefix becomes `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let body = prefix.trim_start_matches('/');
    let lead = if body.len() < prefix.len() { "/" } else { "" };
    let body = body.trim_end_matches('/');
    if body.is_empty() {
        return "/".to_string();
    }
    format!("{lead}{body}/")
}
