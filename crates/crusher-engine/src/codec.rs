use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Errors from compressing or decompressing a payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
}

/// Lossless, deterministic text-to-text compression.
///
/// Output must be safe to embed in a JSON string and to split at any
/// character boundary.
pub trait Codec: Send + Sync {
    fn compress(&self, text: &str) -> Result<String, CodecError>;
    fn decompress(&self, text: &str) -> Result<String, CodecError>;
}

/// zstd compression followed by standard base64.
#[derive(Clone, Copy, Debug)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub const DEFAULT_LEVEL: i32 = 3;

    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

impl Codec for ZstdCodec {
    fn compress(&self, text: &str) -> Result<String, CodecError> {
        let compressed = zstd::encode_all(text.as_bytes(), self.level)
            .map_err(|e| CodecError::CompressionFailed(e.to_string()))?;
        Ok(STANDARD.encode(compressed))
    }

    fn decompress(&self, text: &str) -> Result<String, CodecError> {
        let compressed = STANDARD
            .decode(text)
            .map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;
        let raw = zstd::decode_all(compressed.as_slice())
            .map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;
        String::from_utf8(raw).map_err(|e| CodecError::DecompressionFailed(e.to_string()))
    }
}
