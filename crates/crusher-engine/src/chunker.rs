use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crusher_crypto::{generate_uid, ContentHasher, FRAGMENT_ID_LEN};
use crusher_store::StoreAdapter;
use crusher_types::{
    expiry_after, Clock, Digest, Envelope, FragmentRecord, MasterBody, MasterRecord, PropKey,
    RecordMeta, SystemClock, Value,
};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{Codec, ZstdCodec};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::{fragment, key, package};

/// Normalised view of a property's master record.
///
/// An absent property has an empty `digest` and nothing else set. An inline
/// property carries its decoded envelope in `data`; a fragmented one lists
/// its fragment keys in `chunks` and leaves `data` empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkDescriptor {
    pub chunks: Option<Vec<String>>,
    pub data: Option<Envelope>,
    pub digest: String,
    pub skip_zip: bool,
    pub expires_at: Option<i64>,
    pub uselz: bool,
}

impl ChunkDescriptor {
    /// Returns `true` if a master record was found.
    pub fn exists(&self) -> bool {
        !self.digest.is_empty()
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        matches!(self.expires_at, Some(at) if at < now_ms)
    }
}

/// Outcome of reading a property.
#[derive(Debug)]
pub enum Lookup {
    Found(Value),
    Absent,
    /// The property had expired. It is reported absent whatever `cleanup`
    /// says; `cleanup` is the result of deleting its records.
    Expired { cleanup: EngineResult<usize> },
}

impl Lookup {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Found(v) => Some(v),
            Self::Absent | Self::Expired { .. } => None,
        }
    }
}

/// Stores values of any size in a record-capped backend.
///
/// A value is packed into an [`Envelope`], serialised, digested, compressed
/// when large enough, and split into fragments that each fit one backend
/// record. Fragments are always committed before the master record that
/// references them, so a reader that can see a master can resolve all of
/// its fragments.
pub struct Chunker {
    config: EngineConfig,
    store: Arc<dyn StoreAdapter>,
    codec: Arc<dyn Codec>,
    clock: Arc<dyn Clock>,
}

impl Chunker {
    /// Create an engine over `store`. Fails if the configuration is unusable.
    pub fn new(config: EngineConfig, store: Arc<dyn StoreAdapter>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            codec: Arc::new(ZstdCodec::default()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the compression codec.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the clock used for expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reduce a property key to its string form.
    pub fn fudge_key(&self, key: &PropKey) -> EngineResult<String> {
        key::fudge_key(key)
    }

    /// Store `value` under `key`, returning the bytes written.
    ///
    /// Returns 0 without touching the backend when digest-respecting mode is
    /// on, no expiry is requested, and the stored content already has the
    /// same digest. Otherwise the existing property is removed and the new
    /// one written from scratch.
    pub async fn put(
        &self,
        key: impl Into<PropKey>,
        value: impl Into<Value>,
        expire_seconds: Option<u64>,
    ) -> EngineResult<usize> {
        let fudged = key::fudge_key(&key.into())?;
        let value = value.into();
        let expire_seconds = expire_seconds.filter(|s| *s > 0);

        let envelope = package::pack(&value, self.config.uselz)?;
        let sob = package::serialize(&envelope)?;
        let digest = ContentHasher::ENVELOPE.digest_str(&sob);
        let master_key = self.master_key(&fudged);

        match self.read_master(&master_key).await {
            Ok(Some(master))
                if self.config.respect_digest
                    && expire_seconds.is_none()
                    && master.meta.digest.parse::<Digest>().ok() == Some(digest) =>
            {
                debug!(key = %master_key, digest = %digest.short_hex(), "digest unchanged, nothing to write");
                return Ok(0);
            }
            Ok(_) => {}
            Err(EngineError::Corruption { reason, .. }) => {
                warn!(key = %master_key, %reason, "overwriting unreadable master record");
            }
            Err(e) => return Err(e),
        }

        // nothing is deleted unless the new property can be written
        let pending = self.prepare_write(&master_key, &sob, digest, expire_seconds)?;
        self.remove_master(&master_key).await?;
        self.commit_write(&master_key, pending).await
    }

    /// Read the value stored under `key`, or `None` if absent or expired.
    pub async fn get(&self, key: impl Into<PropKey>) -> EngineResult<Option<Value>> {
        Ok(self.lookup(key).await?.into_value())
    }

    /// Read the value stored under `key`, distinguishing an expired property
    /// (and the outcome of cleaning it up) from one that never existed.
    pub async fn lookup(&self, key: impl Into<PropKey>) -> EngineResult<Lookup> {
        let fudged = key::fudge_key(&key.into())?;
        let master_key = self.master_key(&fudged);
        let descriptor = self.read_descriptor(&master_key).await?;

        if descriptor.is_expired(self.clock.now_ms()) {
            let cleanup = self.remove_master(&master_key).await;
            if let Err(e) = &cleanup {
                warn!(key = %master_key, error = %e, "ignored an error cleaning up expired property");
            }
            return Ok(Lookup::Expired { cleanup });
        }

        let envelope = match descriptor {
            ChunkDescriptor {
                chunks: Some(keys),
                skip_zip,
                ..
            } => self.reassemble(&master_key, &keys, skip_zip).await?,
            ChunkDescriptor {
                data: Some(envelope),
                ..
            } => envelope,
            _ => return Ok(Lookup::Absent),
        };
        Ok(Lookup::Found(package::unpack(&master_key, envelope)?))
    }

    /// Delete the property stored under `key`, returning how many records
    /// were deleted. An absent property yields 0.
    pub async fn remove(&self, key: impl Into<PropKey>) -> EngineResult<usize> {
        let fudged = key::fudge_key(&key.into())?;
        self.remove_master(&self.master_key(&fudged)).await
    }

    /// Describe how the property under `key` is laid out in the backend.
    pub async fn chunk_keys(&self, key: impl Into<PropKey>) -> EngineResult<ChunkDescriptor> {
        let fudged = key::fudge_key(&key.into())?;
        self.read_descriptor(&self.master_key(&fudged)).await
    }

    fn master_key(&self, fudged: &str) -> String {
        format!("{}{}", self.config.prefix, fudged)
    }

    fn prepare_write<'a>(
        &self,
        master_key: &str,
        sob: &'a str,
        digest: Digest,
        expire_seconds: Option<u64>,
    ) -> EngineResult<PendingWrite<'a>> {
        let skip_zip = !self.config.uselz || sob.len() < self.config.compress_min;
        let crushed: Cow<'a, str> = if skip_zip {
            Cow::Borrowed(sob)
        } else {
            Cow::Owned(self.codec.compress(sob)?)
        };

        let meta = RecordMeta {
            digest: digest.to_hex(),
            skip_zip,
            expires_at: expire_seconds.map(|s| expiry_after(self.clock.now_ms(), s)),
            uselz: self.config.uselz,
            prop_key: master_key.to_string(),
        };
        let payload = fragment::payload_size(
            self.config.chunk_size,
            serde_json::to_string(&meta)?.len(),
        )?;
        Ok(PendingWrite {
            meta,
            crushed,
            payload,
            expire_seconds,
        })
    }

    async fn commit_write(&self, master_key: &str, pending: PendingWrite<'_>) -> EngineResult<usize> {
        let PendingWrite {
            meta,
            crushed,
            payload,
            expire_seconds,
        } = pending;
        let skip_zip = meta.skip_zip;
        let lumps = fragment::split(&crushed, payload);

        let (body, fragment_bytes) = if lumps.len() > 1 {
            let keys: Vec<String> = lumps.iter().map(|_| fragment_key(master_key)).collect();
            // fragments must outlive the master
            let fragment_expiry = expire_seconds.map(|s| s.saturating_add(1));
            let writes = keys.iter().zip(&lumps).map(|(k, chunk)| {
                let record = FragmentRecord {
                    prop_key: master_key.to_string(),
                    chunk: (*chunk).to_string(),
                };
                self.write_record(k, record, fragment_expiry, master_key)
            });
            let sizes = try_join_all(writes).await?;
            (MasterBody::Fragmented(keys), sizes.into_iter().sum())
        } else {
            (MasterBody::Inline(lumps[0].to_string()), 0)
        };

        let fragments = lumps.len();
        let master_bytes = self
            .write_record(master_key, MasterRecord { meta, body }, expire_seconds, master_key)
            .await?;
        let total = fragment_bytes + master_bytes;
        info!(
            key = %master_key,
            fragments,
            skip_zip,
            bytes = total,
            "property written"
        );
        Ok(total)
    }

    async fn write_record<T: Serialize>(
        &self,
        key: &str,
        record: T,
        expire_seconds: Option<u64>,
        prop_key: &str,
    ) -> EngineResult<usize> {
        let text = serde_json::to_string(&record)?;
        let receipt = self
            .store
            .write(key, &text, expire_seconds, Some(prop_key))
            .await?;
        Ok(receipt.bytes)
    }

    async fn read_record(&self, key: &str) -> EngineResult<Option<String>> {
        match self.store.read(key).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_record(&self, key: &str) -> EngineResult<()> {
        match self.store.remove(key).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_master(&self, master_key: &str) -> EngineResult<Option<MasterRecord>> {
        let Some(text) = self.read_record(master_key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&text).map(Some).map_err(|e| {
            EngineError::corruption(master_key, format!("unreadable master record: {e}"))
        })
    }

    async fn read_descriptor(&self, master_key: &str) -> EngineResult<ChunkDescriptor> {
        let Some(MasterRecord { meta, body }) = self.read_master(master_key).await? else {
            return Ok(ChunkDescriptor::default());
        };
        let (chunks, data) = match body {
            MasterBody::Fragmented(keys) => (Some(keys), None),
            MasterBody::Inline(chunk) => (
                None,
                Some(self.decode_payload(master_key, &chunk, meta.skip_zip)?),
            ),
        };
        Ok(ChunkDescriptor {
            chunks,
            data,
            digest: meta.digest,
            skip_zip: meta.skip_zip,
            expires_at: meta.expires_at,
            uselz: meta.uselz,
        })
    }

    async fn reassemble(
        &self,
        master_key: &str,
        keys: &[String],
        skip_zip: bool,
    ) -> EngineResult<Envelope> {
        let records = try_join_all(keys.iter().map(|k| self.read_record(k))).await?;

        let mut chunks = Vec::with_capacity(keys.len());
        for (k, record) in keys.iter().zip(records) {
            let text = record.ok_or_else(|| {
                EngineError::corruption(master_key, format!("missing fragment {k}"))
            })?;
            let fragment: FragmentRecord = serde_json::from_str(&text).map_err(|e| {
                EngineError::corruption(master_key, format!("unreadable fragment {k}: {e}"))
            })?;
            chunks.push(fragment.chunk);
        }
        let crushed = fragment::join(chunks.iter().map(String::as_str));
        self.decode_payload(master_key, &crushed, skip_zip)
    }

    fn decode_payload(&self, master_key: &str, crushed: &str, skip_zip: bool) -> EngineResult<Envelope> {
        let text: Cow<'_, str> = if skip_zip {
            Cow::Borrowed(crushed)
        } else {
            Cow::Owned(
                self.codec
                    .decompress(crushed)
                    .map_err(|e| EngineError::corruption(master_key, e.to_string()))?,
            )
        };
        package::parse(master_key, &text)
    }

    /// Fragments first, then the master. A failed fragment delete leaves the
    /// master in place and is reported to the caller.
    async fn remove_master(&self, master_key: &str) -> EngineResult<usize> {
        let master = match self.read_master(master_key).await {
            Ok(master) => master,
            Err(EngineError::Corruption { reason, .. }) => {
                warn!(key = %master_key, %reason, "removing unreadable master record, its fragments cannot be located");
                self.delete_record(master_key).await?;
                return Ok(1);
            }
            Err(e) => return Err(e),
        };
        let Some(master) = master else {
            return Ok(0);
        };

        let results = join_all(master.fragment_keys().iter().map(|k| self.delete_record(k))).await;
        let mut removed = 0;
        let mut failure = None;
        for result in results {
            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            warn!(
                key = %master_key,
                removed,
                total = master.fragment_keys().len(),
                "fragment removal failed, remaining fragments may be orphaned"
            );
            return Err(e);
        }

        self.delete_record(master_key).await?;
        info!(key = %master_key, fragments = removed, "property removed");
        Ok(removed + 1)
    }
}

impl fmt::Debug for Chunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A property that has been packed, compressed and sized, but not yet
/// written.
struct PendingWrite<'a> {
    meta: RecordMeta,
    crushed: Cow<'a, str>,
    payload: usize,
    expire_seconds: Option<u64>,
}

/// Derive a fresh fragment key. Uniqueness is not checked against the store.
fn fragment_key(master_key: &str) -> String {
    format!("{master_key}_{}", generate_uid(FRAGMENT_ID_LEN))
}
