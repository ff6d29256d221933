use crusher_crypto::ContentHasher;
use crusher_types::PropKey;

use crate::error::{EngineError, EngineResult};

/// Reduce a property key to the string used in the backend.
///
/// Text keys pass through, numbers are formatted, and structured keys are
/// replaced by the hex digest of their JSON form.
pub fn fudge_key(key: &PropKey) -> EngineResult<String> {
    if !key.is_valid() {
        return Err(EngineError::InvalidKey(format!(
            "property key must have a value, got {key}"
        )));
    }
    match key {
        PropKey::Text(s) => Ok(s.clone()),
        PropKey::Number(_) => Ok(key.to_string()),
        PropKey::Structured(v) => ContentHasher::KEY
            .digest_json(v)
            .map(|d| d.to_hex())
            .map_err(|e| EngineError::InvalidKey(e.to_string())),
    }
}
