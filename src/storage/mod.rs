//! Persistence layer
//!
//! All stores write to the same storage medium but to disjoint keys, so
//! cross-store writes never conflict; only same-key writes from independent
//! engines sharing a medium are subject to the documented last-writer-wins
//! race. The [`Storage`] handle adds typed JSON accessors over the raw
//! medium and broadcasts a [`StorageEvent`] on every mutation for
//! in-process observers.

pub mod bounded;
pub mod file;
pub mod medium;

pub use bounded::BoundedLog;
pub use file::FileMedium;
pub use medium::{MemoryMedium, StorageMedium};

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered change events per subscriber before lagging
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Broadcast payload describing one mutated key
#[derive(Debug, Clone)]
pub struct StorageEvent {
    /// The mutated collection's key
    pub key: String,
    /// The new serialized value (`None` after a removal)
    pub value: Option<String>,
}

/// Handle over a shared medium with typed JSON accessors and a
/// per-mutation change broadcast.
///
/// The broadcast is in-process only: engines in other processes sharing
/// the same medium do not see these events, so it does not mitigate the
/// cross-process race documented on [`StorageMedium`].
#[derive(Clone)]
pub struct Storage {
    medium: Arc<dyn StorageMedium>,
    changes: broadcast::Sender<StorageEvent>,
}

impl Storage {
    /// Wrap an injected medium.
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { medium, changes }
    }

    /// Storage over a fresh in-process medium.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryMedium::new()))
    }

    /// Parse the collection stored under `key`.
    ///
    /// A missing key is the empty collection; a corrupt value is logged and
    /// also read as empty rather than surfaced.
    pub fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.medium.load(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Corrupt collection under {}: {}", key, e);
                    T::default()
                }
            },
            None => T::default(),
        }
    }

    /// Serialize `value` under `key` and broadcast the change.
    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.medium.store(key, &raw)?;
        let _ = self.changes.send(StorageEvent {
            key: key.to_string(),
            value: Some(raw),
        });
        Ok(())
    }

    /// Remove `key` and broadcast the removal.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.medium.remove(key)?;
        let _ = self.changes.send(StorageEvent {
            key: key.to_string(),
            value: None,
        });
        Ok(())
    }

    /// Subscribe to per-mutation change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.changes.subscribe()
    }
}

/// Current time in Unix milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
