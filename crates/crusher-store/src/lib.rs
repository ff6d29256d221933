//! Store adapter contract for crusher.
//!
//! The chunking engine never talks to a backend directly. Object storage,
//! a version-controlled file host, a folder-based document store, and a
//! key-value cache all sit behind the narrow [`StoreAdapter`] trait: `read`,
//! `write`, and `remove` over opaque string keys.
//!
//! # Reference Adapters
//!
//! - [`InMemoryStore`] -- `HashMap`-based key-value store with TTL, for tests and embedding
//! - [`FolderStore`] -- one file per key under a local folder
//! - [`SerializedStore`] -- wraps any adapter so calls are issued one at a time
//!
//! # Adapter Rules
//!
//! 1. `write` stores the full string atomically or fails.
//! 2. `read` returns exactly the string previously written, or `None`.
//! 3. Removing an absent key is not a failure: report [`RemoveOutcome::NotFound`].
//! 4. Adapters own retries, timeouts, and any serialisation their backend needs.
//! 5. The store never interprets record contents.

pub mod backend;
pub mod error;
pub mod folder;
pub mod memory;
pub mod serialized;
pub mod traits;

pub use backend::{normalize_prefix, BackendKind};
pub use error::{StoreError, StoreResult};
pub use folder::FolderStore;
pub use memory::InMemoryStore;
pub use serialized::SerializedStore;
pub use traits::{RemoveOutcome, StoreAdapter, WriteReceipt};
