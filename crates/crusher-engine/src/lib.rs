//! Chunking engine for crusher.
//!
//! Stores values of arbitrary size in backends that cap the size of a single
//! record. A value is packed into a self-describing envelope, serialised,
//! digested, compressed when it is large enough, and split across as many
//! records as needed. A master record ties the fragments together.
//!
//! # Key Types
//!
//! - [`Chunker`] -- the engine: `put`, `get`, `lookup`, `remove`, `chunk_keys`
//! - [`EngineConfig`] -- chunk size, namespace prefix, and compression settings
//! - [`ChunkDescriptor`] -- how a property is laid out in the backend
//! - [`Codec`] / [`ZstdCodec`] -- string-to-string payload compression
//!
//! # Write Protocol
//!
//! 1. Fragments are written concurrently, each under `{master}_{id}`.
//! 2. The master record is written only after every fragment succeeded.
//! 3. A write whose digest matches the stored one is skipped entirely,
//!    unless an expiry is requested or digest checks are disabled.
//!
//! Expiry is lazy: an expired property is deleted by the first read that
//! notices it.

pub mod chunker;
pub mod codec;
pub mod config;
pub mod error;
pub mod fragment;
pub mod key;
pub mod package;

pub use chunker::{ChunkDescriptor, Chunker, Lookup};
pub use codec::{Codec, CodecError, ZstdCodec};
pub use config::{EngineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_COMPRESS_MIN, DEFAULT_PREFIX, RECORD_OVERHEAD};
pub use error::{EngineError, EngineResult};
pub use key::fudge_key;
