use thiserror::Error;

/// Errors from parsing stored identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("digest is not hex: {0}")]
    DigestNotHex(String),

    #[error("digest must be 32 bytes, got {0}")]
    DigestLength(usize),
}
