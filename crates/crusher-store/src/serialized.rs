use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RemoveOutcome, StoreAdapter, WriteReceipt};

/// Queues every call to the wrapped adapter so at most one is in flight.
///
/// For backends that reject concurrent requests from the same credential,
/// such as content APIs of version-controlled file hosts. The engine still
/// fans out freely; this wrapper turns the fan-out into a FIFO queue.
pub struct SerializedStore<S> {
    inner: S,
    permits: Semaphore,
}

impl<S: StoreAdapter> SerializedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            permits: Semaphore::new(1),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: StoreAdapter> StoreAdapter for SerializedStore<S> {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let _permit = self.permits.acquire().await.map_err(queue_closed)?;
        self.inner.read(key).await
    }

    async fn write(
        &self,
        key: &str,
        value: &str,
        expire_seconds: Option<u64>,
        prop_key: Option<&str>,
    ) -> StoreResult<WriteReceipt> {
        let _permit = self.permits.acquire().await.map_err(queue_closed)?;
        self.inner.write(key, value, expire_seconds, prop_key).await
    }

    async fn remove(&self, key: &str) -> StoreResult<RemoveOutcome> {
        let _permit = self.permits.acquire().await.map_err(queue_closed)?;
        self.inner.remove(key).await
    }
}

fn queue_closed(_: tokio::sync::AcquireError) -> StoreError {
    StoreError::Backend("request queue closed".into())
}
