//! Foundation types for crusher.
//!
//! crusher stores arbitrarily large values in backends whose individual
//! records are capped in size. This crate holds the vocabulary shared by the
//! engine, the store adapters, and the CLI.
//!
//! # Key Types
//!
//! - [`PropKey`] -- caller-facing property identifier (text, number, or structured)
//! - [`Value`] -- the value shapes a property can hold, including [`Blob`]
//! - [`Envelope`] -- typed, versioned wrapper serialised before compression
//! - [`MasterRecord`] / [`FragmentRecord`] -- what actually lands in the backend
//! - [`Digest`] -- BLAKE3 fingerprint of a serialised envelope
//! - [`Clock`] -- wall-clock source used for expiry decisions

pub mod digest;
pub mod envelope;
pub mod error;
pub mod key;
pub mod record;
pub mod temporal;
pub mod value;

pub use digest::Digest;
pub use envelope::{Envelope, Payload, Primitive, ENVELOPE_VERSION};
pub use error::TypeError;
pub use key::PropKey;
pub use record::{FragmentRecord, MasterBody, MasterRecord, RecordMeta};
pub use temporal::{expiry_after, Clock, ManualClock, SystemClock};
pub use value::{Blob, Value};
