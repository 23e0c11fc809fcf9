//! Key-value storage backends.
//!
//! The event store keeps each event as a JSON string under its own key.
//! Backends only move strings around; parsing happens in the store.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::SnapResult;

/// A flat string-to-string namespace.
///
/// Failures of the backend itself (disk full, permissions, quota) surface as
/// `SnapError::StorageUnavailable`.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> SnapResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> SnapResult<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> SnapResult<()>;

    fn keys(&self) -> SnapResult<Vec<String>>;
}
