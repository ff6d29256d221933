use crusher_store::{normalize_prefix, BackendKind};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Fixed per-record overhead floor. A chunk size at or below this cannot
/// hold a record's metadata plus any payload.
pub const RECORD_OVERHEAD: usize = 200;

pub const DEFAULT_CHUNK_SIZE: usize = 9 * 1024;
pub const DEFAULT_PREFIX: &str = "chunking_";
pub const DEFAULT_COMPRESS_MIN: usize = 300;

/// Configuration for the chunking engine.
///
/// Built once and handed to [`crate::Chunker::new`], which validates it
/// eagerly. There are no setters on the engine itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum size of one stored record, in bytes.
    pub chunk_size: usize,
    /// Namespace prepended to every property key.
    pub prefix: String,
    /// Serialised envelopes shorter than this are stored uncompressed.
    pub compress_min: usize,
    /// Skip writes whose content digest matches the stored master record.
    pub respect_digest: bool,
    /// Compress payloads at or above `compress_min`. When `false`, every
    /// payload is stored uncompressed.
    pub uselz: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            prefix: DEFAULT_PREFIX.to_string(),
            compress_min: DEFAULT_COMPRESS_MIN,
            respect_digest: true,
            uselz: true,
        }
    }
}

impl EngineConfig {
    /// Preset for a backend family.
    ///
    /// Backends that own their namespace (a folder, a bucket path, a repo
    /// path) get an empty engine prefix. Digest-respecting writes are off, so
    /// every `put` rewrites what is stored.
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            chunk_size: kind.default_chunk_size(),
            prefix: if kind.owns_namespace() {
                String::new()
            } else {
                DEFAULT_PREFIX.to_string()
            },
            respect_digest: false,
            ..Default::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use a folder-style namespace, such as `/crusher/store`, as the prefix.
    /// Leading and trailing slash runs are reduced to one slash.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.prefix = normalize_prefix(namespace);
        self
    }

    pub fn with_compress_min(mut self, compress_min: usize) -> Self {
        self.compress_min = compress_min;
        self
    }

    pub fn with_respect_digest(mut self, respect_digest: bool) -> Self {
        self.respect_digest = respect_digest;
        self
    }

    pub fn with_uselz(mut self, uselz: bool) -> Self {
        self.uselz = uselz;
        self
    }

    /// Check the settings that do not depend on any particular key.
    pub fn validate(&self) -> EngineResult<()> {
        if self.chunk_size <= RECORD_OVERHEAD {
            return Err(EngineError::Configuration(format!(
                "chunk size must be at least {}, got {}",
                RECORD_OVERHEAD + 1,
                self.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.chunk_size, 9216);
        assert_eq!(c.prefix, "chunking_");
        assert_eq!(c.compress_min, 300);
        assert!(c.respect_digest);
        assert!(c.uselz);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn backend_presets() {
        let kv = EngineConfig::for_backend(BackendKind::KeyValueCache);
        assert_eq!(kv.chunk_size, 400_000);
        assert_eq!(kv.prefix, DEFAULT_PREFIX);
        assert!(!kv.respect_digest);

        let host = EngineConfig::for_backend(BackendKind::FileHost);
        assert_eq!(host.chunk_size, 500_000);
        assert!(host.prefix.is_empty());
    }

    #[test]
    fn namespace_becomes_a_folder_prefix() {
        let kv =
            EngineConfig::for_backend(BackendKind::KeyValueCache).with_namespace("crusher/store");
        assert_eq!(kv.prefix, "crusher/store/");
        assert_eq!(kv.with_namespace("//crusher/store//").prefix, "/crusher/store/");
        assert_eq!(EngineConfig::default().with_namespace("").prefix, "/");
    }

    #[test]
    fn tiny_chunk_size_is_rejected() {
        for size in [0, 1, RECORD_OVERHEAD] {
            let err = EngineConfig::default().with_chunk_size(size).validate().unwrap_err();
            assert!(matches!(err, EngineError::Configuration(_)));
        }
        assert!(EngineConfig::default()
            .with_chunk_size(RECORD_OVERHEAD + 1)
            .validate()
            .is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"chunk_size": 4096}"#).unwrap();
        assert_eq!(c.chunk_size, 4096);
        assert_eq!(c.prefix, DEFAULT_PREFIX);
        assert!(c.uselz);
    }
}
