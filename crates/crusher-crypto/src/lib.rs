//! Digest and identifier primitives for crusher.
//!
//! Provides domain-separated BLAKE3 fingerprints for envelopes and structured
//! keys, and the short random identifiers that name fragment records.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod uid;

pub use hasher::{ContentHasher, HasherError};
pub use uid::{generate_uid, FRAGMENT_ID_LEN};
