use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use crusher_types::{expiry_after, Clock, SystemClock};

use crate::error::StoreResult;
use crate::traits::{RemoveOutcome, StoreAdapter, WriteReceipt};

struct Entry {
    value: String,
    expires_at: Option<i64>,
}

impl Entry {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at.map_or(true, |at| at > now_ms)
    }
}

/// In-memory, HashMap-based key-value store with per-key TTL.
///
/// Behaves like a cache backend: an expired entry reads as absent. Intended
/// for tests and embedding. Call counters let callers assert how much
/// backend traffic an operation caused.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    removes: AtomicUsize,
}

impl InMemoryStore {
    /// Create a new empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty store that evaluates TTLs against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }

    /// Number of live (unexpired) records.
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    /// Returns `true` if the store holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of every key physically present, expired or not.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Read a record without TTL checks or call accounting.
    pub fn raw_get(&self, key: &str) -> Option<String> {
        let map = self.entries.read().expect("lock poisoned");
        map.get(key).map(|e| e.value.clone())
    }

    /// Overwrite a record without TTL or call accounting.
    pub fn raw_put(&self, key: &str, value: &str) {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Delete a record without call accounting. Returns `true` if it existed.
    pub fn raw_delete(&self, key: &str) -> bool {
        let mut map = self.entries.write().expect("lock poisoned");
        map.remove(key).is_some()
    }

    /// Total bytes across all stored records.
    pub fn total_bytes(&self) -> usize {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(|e| e.value.len())
            .sum()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreAdapter for InMemoryStore {
    async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now_ms();
        let map = self.entries.read().expect("lock poisoned");
        Ok(map
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn write(
        &self,
        key: &str,
        value: &str,
        expire_seconds: Option<u64>,
        _prop_key: Option<&str>,
    ) -> StoreResult<WriteReceipt> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let expires_at = expire_seconds.map(|s| expiry_after(self.clock.now_ms(), s));
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(WriteReceipt::new(value.len()))
    }

    async fn remove(&self, key: &str) -> StoreResult<RemoveOutcome> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(match map.remove(key) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::NotFound,
        })
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryStore")
            .field("record_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crusher_types::ManualClock;
    use std::time::Duration;

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn write_then_read() {
        let store = InMemoryStore::new();
        let receipt = store.write("k", "hello", None, Some("k")).await.unwrap();
        assert_eq!(receipt.bytes, 5);
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn read_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.read("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = InMemoryStore::new();
        store.write("k", "one", None, None).await.unwrap();
        store.write("k", "two", None, None).await.unwrap();
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn remove_present_then_absent() {
        let store = InMemoryStore::new();
        store.write("k", "v", None, None).await.unwrap();
        assert_eq!(store.remove("k").await.unwrap(), RemoveOutcome::Removed);
        assert_eq!(store.remove("k").await.unwrap(), RemoveOutcome::NotFound);
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // TTL
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let clock = Arc::new(ManualClock::new(0));
        let store = InMemoryStore::with_clock(clock.clone());
        store.write("k", "v", Some(2), None).await.unwrap();

        clock.advance(Duration::from_millis(1_999));
        assert!(store.read("k").await.unwrap().is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.read("k").await.unwrap().is_none());
        assert_eq!(store.len(), 0);
        // still physically present until removed
        assert_eq!(store.keys(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn huge_ttl_never_expires() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let store = InMemoryStore::with_clock(clock.clone());
        store.write("k", "v", Some(u64::MAX), None).await.unwrap();
        store.write("j", "w", Some(i64::MAX as u64), None).await.unwrap();

        clock.advance(Duration::from_secs(100 * 365 * 24 * 3600));
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.read("j").await.unwrap().as_deref(), Some("w"));
    }

    // -----------------------------------------------------------------------
    // Accounting and raw access
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn counters_track_calls() {
        let store = InMemoryStore::new();
        store.write("a", "1", None, None).await.unwrap();
        store.read("a").await.unwrap();
        store.read("b").await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_count(), 2);
        assert_eq!(store.remove_count(), 1);
    }

    #[tokio::test]
    async fn raw_access_bypasses_counters() {
        let store = InMemoryStore::new();
        store.raw_put("x", "abc");
        assert_eq!(store.raw_get("x").as_deref(), Some("abc"));
        assert_eq!(store.total_bytes(), 3);
        assert!(store.raw_delete("x"));
        assert!(!store.raw_delete("x"));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.remove_count(), 0);
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let store = InMemoryStore::new();
        for k in ["c", "a", "b"] {
            store.write(k, k, None, None).await.unwrap();
        }
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn concurrent_writes_are_safe() {
        let store = Arc::new(InMemoryStore::new());
        let writes = (0..16).map(|i| {
            let store = Arc::clone(&store);
            async move {
                store
                    .write(&format!("k{i}"), "v", None, None)
                    .await
                    .unwrap()
            }
        });
        futures::future::join_all(writes).await;
        assert_eq!(store.len(), 16);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryStore::new();
        store.raw_put("x", "1");
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryStore"));
        assert!(debug.contains("record_count"));
    }
}
