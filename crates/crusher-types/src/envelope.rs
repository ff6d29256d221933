use serde::{Deserialize, Serialize};

/// Current envelope encoding version.
pub const ENVELOPE_VERSION: u16 = 1;

/// Typed wrapper around a property's value, serialised before compression
/// and fragmentation.
///
/// The serialised form of an envelope is what the digest is computed over,
/// so field order and naming here are part of the stored format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub v: u16,
    pub uselz: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Envelope {
    pub fn new(payload: Payload, uselz: bool) -> Self {
        Self {
            v: ENVELOPE_VERSION,
            uselz,
            payload,
        }
    }
}

/// One variant per value shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// Plain scalar stored verbatim.
    Primitive { content: Primitive },
    /// Structured object; `content` is its JSON text, re-parsed on read.
    Parse { content: String },
    /// Timestamp as epoch milliseconds.
    Date { content: i64 },
    /// Binary content as standard base64.
    Blob {
        content: String,
        #[serde(rename = "contentType")]
        content_type: Option<String>,
        name: Option<String>,
    },
}

/// Scalar content of a [`Payload::Primitive`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Number(f64),
    Text(String),
}
