use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// What an adapter reports after a successful write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Size of the record as written, in bytes.
    pub bytes: usize,
}

impl WriteReceipt {
    pub fn new(bytes: usize) -> Self {
        Self { bytes }
    }
}

/// Outcome of a remove call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Backend adapter consumed by the chunking engine.
///
/// All implementations must satisfy these invariants:
/// - `write` accepts the full string atomically: a later `read` returns
///   either the whole value or the previous one, never a prefix.
/// - `read` returns `Ok(None)` for absent keys.
/// - `remove` of an absent key returns `Ok(RemoveOutcome::NotFound)` or
///   `Err(StoreError::NotFound)`; neither is treated as a failure.
/// - Calls may be issued concurrently. Backends that cannot accept
///   concurrent requests must queue them internally (see [`crate::SerializedStore`]).
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Read the string stored under `key`.
    async fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`.
    ///
    /// `expire_seconds` is a TTL hint; backends without native expiry may
    /// ignore it. `prop_key` names the logical property the record belongs
    /// to, for backends that batch or group writes per property.
    async fn write(
        &self,
        key: &str,
        value: &str,
        expire_seconds: Option<u64>,
        prop_key: Option<&str>,
    ) -> StoreResult<WriteReceipt>;

    /// Delete the record stored under `key`.
    async fn remove(&self, key: &str) -> StoreResult<RemoveOutcome>;
}

#[async_trait]
impl<S: StoreAdapter + ?Sized> StoreAdapter for Arc<S> {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key).await
    }

    async fn write(
        &self,
        key: &str,
        value: &str,
        expire_seconds: Option<u64>,
        prop_key: Option<&str>,
    ) -> StoreResult<WriteReceipt> {
        (**self).write(key, value, expire_seconds, prop_key).await
    }

    async fn remove(&self, key: &str) -> StoreResult<RemoveOutcome> {
        (**self).remove(key).await
    }
}
