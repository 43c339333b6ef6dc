//! Key-value persistence - the string-by-key store the task book writes its blob to.
//!
//! The task book only ever calls [`KeyValueStore::get`] and [`KeyValueStore::set`],
//! so the backend can be swapped without touching the model.

/// Directory-backed store, one file per key
pub mod file;
/// Process-local store used by tests and ephemeral sessions
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::Result;

/// Minimal string store scoped to one device.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Where the entries live, for status output. `None` for process-local stores.
    fn location(&self) -> Option<String> {
        None
    }
}
