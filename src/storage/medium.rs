//! Storage medium abstraction
//!
//! Every persisted collection lives under a text key in one shared medium.
//! Media are injected at construction so tests run against an in-process
//! map while the default deployment persists one JSON file per key.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::RwLock;

/// A flat text key space shared by all stores.
///
/// Values are serialized text, parsed back on every read. A missing key is
/// `None`, never an error; callers substitute the empty collection. The
/// medium offers no locking, versioning, or transactions: independent
/// engines sharing one medium race on same-key read-modify-write cycles
/// with last-writer-wins semantics.
pub trait StorageMedium: Send + Sync {
    /// Read the value stored under `key`.
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn store(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process medium backed by a plain map.
///
/// Nothing is persisted; used by tests and as the `memory` storage backend.
#[derive(Default)]
pub struct MemoryMedium {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryMedium {
    /// Create an empty in-process medium.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageMedium for MemoryMedium {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
