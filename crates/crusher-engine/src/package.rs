//! Envelope packing and unpacking.
//!
//! The serialised envelope is the unit that gets digested, compressed, and
//! fragmented. Two values that serialise identically always share a digest.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use crusher_types::{Blob, Envelope, Payload, Primitive, Value};

use crate::error::{EngineError, EngineResult};

/// Wrap a value in its typed envelope.
pub fn pack(value: &Value, uselz: bool) -> EngineResult<Envelope> {
    let payload = match value {
        Value::Blob(blob) => Payload::Blob {
            content: STANDARD.encode(&blob.bytes),
            content_type: blob.content_type.clone(),
            name: blob.name.clone(),
        },
        Value::Timestamp(t) => Payload::Date {
            content: t.timestamp_millis(),
        },
        Value::Structured(v) => Payload::Parse {
            content: serde_json::to_string(v)?,
        },
        Value::Number(n) if !n.is_finite() => {
            return Err(EngineError::InvalidValue(format!(
                "cannot store non-finite number {n}"
            )));
        }
        Value::Number(n) => Payload::Primitive {
            content: Primitive::Number(*n),
        },
        Value::Bool(b) => Payload::Primitive {
            content: Primitive::Bool(*b),
        },
        Value::Text(s) => Payload::Primitive {
            content: Primitive::Text(s.clone()),
        },
    };
    Ok(Envelope::new(payload, uselz))
}

/// Serialise an envelope to the string that is digested and stored.
pub fn serialize(envelope: &Envelope) -> EngineResult<String> {
    Ok(serde_json::to_string(envelope)?)
}

/// Parse a stored envelope. `key` names the property for error context.
pub fn parse(key: &str, text: &str) -> EngineResult<Envelope> {
    serde_json::from_str(text)
        .map_err(|e| EngineError::corruption(key, format!("unreadable envelope: {e}")))
}

/// Recover the caller's value from an envelope.
pub fn unpack(key: &str, envelope: Envelope) -> EngineResult<Value> {
    match envelope.payload {
        Payload::Parse { content } => serde_json::from_str(&content)
            .map(Value::Structured)
            .map_err(|e| EngineError::corruption(key, format!("unreadable structured content: {e}"))),
        Payload::Date { content } => Utc
            .timestamp_millis_opt(content)
            .single()
            .map(Value::Timestamp)
            .ok_or_else(|| EngineError::corruption(key, format!("timestamp {content} out of range"))),
        Payload::Blob {
            content,
            content_type,
            name,
        } => {
            let bytes = STANDARD
                .decode(content)
                .map_err(|e| EngineError::corruption(key, format!("blob is not base64: {e}")))?;
            Ok(Value::Blob(Blob {
                bytes,
                content_type,
                name,
            }))
        }
        Payload::Primitive { content } => Ok(match content {
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::Text(s) => Value::Text(s),
        }),
    }
}
