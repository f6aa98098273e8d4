//! Bounded insertion-ordered log
//!
//! Shared by the memory and continuity stores: a single-key collection with
//! FIFO eviction enforced on the write path, never lazily on reads.

use crate::error::Result;
use crate::storage::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A capacity-limited log of records under one storage key.
///
/// Appends past capacity evict from the front, oldest first; the relative
/// order of surviving records is preserved.
pub struct BoundedLog<T> {
    storage: Storage,
    key: String,
    capacity: usize,
    _record: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> BoundedLog<T> {
    /// Create a log over `key` retaining at most `capacity` records.
    pub fn new(storage: Storage, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            storage,
            key: key.into(),
            capacity,
            _record: PhantomData,
        }
    }

    /// Append one record, evicting from the front once over capacity.
    pub fn append(&self, record: T) -> Result<()> {
        let mut records: Vec<T> = self.storage.read_json(&self.key);
        records.push(record);
        if records.len() > self.capacity {
            let excess = records.len() - self.capacity;
            records.drain(..excess);
        }
        self.storage.write_json(&self.key, &records)
    }

    /// All retained records, oldest first.
    pub fn read_all(&self) -> Vec<T> {
        self.storage.read_json(&self.key)
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record.
    pub fn clear(&self) -> Result<()> {
        self.storage.write_json(&self.key, &Vec::<T>::new())
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_log(capacity: usize) -> BoundedLog<u64> {
        BoundedLog::new(Storage::in_memory(), "test.log", capacity)
    }

    #[test]
    fn test_append_and_read_all() {
        let log = make_log(10);
        log.append(1).unwrap();
        log.append(2).unwrap();
        assert_eq!(log.read_all(), vec![1, 2]);
    }

    #[test]
    fn test_eviction_is_fifo() {
        let log = make_log(3);
        for n in 1..=5 {
            log.append(n).unwrap();
        }
        assert_eq!(log.read_all(), vec![3, 4, 5]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_capacity_one() {
        let log = make_log(1);
        log.append(1).unwrap();
        log.append(2).unwrap();
        assert_eq!(log.read_all(), vec![2]);
    }

    #[test]
    fn test_empty_log() {
        let log = make_log(3);
        assert!(log.is_empty());
        assert_eq!(log.read_all(), Vec::<u64>::new());
    }

    #[test]
    fn test_clear() {
        let log = make_log(3);
        log.append(1).unwrap();
        log.clear().unwrap();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), 3);
    }
}
