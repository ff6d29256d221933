use crusher_types::Digest;

/// Domain-separated BLAKE3 digests.
///
/// The domain tag is fed to the hasher ahead of the data, so an envelope and
/// a structured key that serialise to the same bytes still get different
/// digests.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Digests serialised envelopes. The hex form is the master record's
    /// `digest` field.
    pub const ENVELOPE: Self = Self {
        domain: "crusher-envelope-v1",
    };
    /// Digests structured property keys into backend key names.
    pub const KEY: Self = Self {
        domain: "crusher-key-v1",
    };

    pub fn digest(&self, data: &[u8]) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    pub fn digest_str(&self, data: &str) -> Digest {
        self.digest(data.as_bytes())
    }

    /// Digest the compact JSON form of `value`. Object members are emitted in
    /// sorted order, so equal maps digest equally.
    pub fn digest_json<T: serde::Serialize>(&self, value: &T) -> Result<Digest, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::NotSerializable(e.to_string()))?;
        Ok(self.digest(&data))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("value cannot be serialised for hashing: {0}")]
    NotSerializable(String),
}
