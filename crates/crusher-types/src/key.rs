use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-facing identifier of a stored property.
///
/// Text and numeric keys are used as-is. Structured keys are reduced to a
/// string by digesting their JSON form before they reach the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropKey {
    Text(String),
    Number(f64),
    Structured(serde_json::Value),
}

impl PropKey {
    /// Returns `true` if this key can address a property.
    ///
    /// A JSON `null` and non-finite numbers have no usable identity.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Number(n) => n.is_finite(),
            Self::Structured(v) => !v.is_null(),
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for PropKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for PropKey {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i32> for PropKey {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for PropKey {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<f64> for PropKey {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<serde_json::Value> for PropKey {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Structured(serde_json::Value::Number(n)),
            },
            other => Self::Structured(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_nan_are_invalid() {
        assert!(!PropKey::Structured(json!(null)).is_valid());
        assert!(!PropKey::Number(f64::NAN).is_valid());
        assert!(!PropKey::Number(f64::INFINITY).is_valid());
    }

    #[test]
    fn ordinary_keys_are_valid() {
        assert!(PropKey::from("settings").is_valid());
        assert!(PropKey::from("").is_valid());
        assert!(PropKey::from(42).is_valid());
        assert!(PropKey::from(json!({"user": 1})).is_valid());
    }

    #[test]
    fn json_scalars_become_plain_keys() {
        assert_eq!(PropKey::from(json!("a")), PropKey::Text("a".into()));
        assert_eq!(PropKey::from(json!(7)), PropKey::Number(7.0));
        assert!(matches!(PropKey::from(json!([1, 2])), PropKey::Structured(_)));
    }

    #[test]
    fn display_numbers_without_fraction() {
        assert_eq!(PropKey::from(42).to_string(), "42");
        assert_eq!(PropKey::from(1.5).to_string(), "1.5");
    }
}
