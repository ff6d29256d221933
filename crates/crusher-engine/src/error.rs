use crusher_store::StoreError;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors from chunking engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration cannot work with this backend, e.g. the chunk size
    /// cannot hold even one empty fragment's metadata.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The property key has no usable identity (null or non-finite).
    #[error("invalid property key: {0}")]
    InvalidKey(String),

    /// The value cannot be packaged for storage.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Stored records cannot be reassembled into the value they describe.
    #[error("corrupt property {key}: {reason}")]
    Corruption { key: String, reason: String },

    /// Compression failed while writing.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Any adapter-level failure, propagated unmodified.
    #[error("backend error: {0}")]
    Backend(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    pub(crate) fn corruption(key: &str, reason: impl Into<String>) -> Self {
        Self::Corruption {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
