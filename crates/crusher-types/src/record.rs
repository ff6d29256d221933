use serde::{Deserialize, Serialize};

/// Fields shared by every master record, independent of layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Hex digest of the serialised envelope.
    pub digest: String,
    /// The payload was stored uncompressed.
    pub skip_zip: bool,
    /// Absolute expiry in epoch milliseconds, `None` for never.
    pub expires_at: Option<i64>,
    pub uselz: bool,
    /// The fudged property key, echoed for adapters that need it.
    pub prop_key: String,
}

/// Where the payload of a master record lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterBody {
    /// The whole payload fits in the master record itself.
    #[serde(rename = "chunk")]
    Inline(String),
    /// Ordered fragment record keys.
    #[serde(rename = "chunks")]
    Fragmented(Vec<String>),
}

/// Top-level record for a property, stored under `prefix + propKey`.
///
/// Always written after every fragment it references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(flatten)]
    pub body: MasterBody,
}

impl MasterRecord {
    /// Fragment keys referenced by this record; empty for inline records.
    pub fn fragment_keys(&self) -> &[String] {
        match &self.body {
            MasterBody::Inline(_) => &[],
            MasterBody::Fragmented(keys) => keys,
        }
    }
}

/// One slice of a property's payload, stored separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub prop_key: String,
    pub chunk: String,
}
