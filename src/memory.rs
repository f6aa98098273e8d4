//! Conversational memory buffer
//!
//! A bounded, insertion-ordered log of raw insight records retained as
//! conversational context for the completion backend. Capacity is enforced
//! on the write path; reads can be biased toward one stage.

use crate::error::Result;
use crate::insight::InsightSource;
use crate::storage::{now_millis, BoundedLog, Storage};

/// Storage key of the global memory log
pub const MEMORY_KEY: &str = "stagesync.memory";

/// Default retained record capacity
pub const MEMORY_CAPACITY: usize = 50;

/// Default number of most-recent records a stage-biased read always includes
pub const RECENCY_WINDOW: usize = 10;

/// Bounded log of captured insight records
pub struct MemoryStore {
    log: BoundedLog<InsightSource>,
    recency_window: usize,
}

impl MemoryStore {
    /// Create a memory store with the default capacity and recency window.
    pub fn new(storage: Storage) -> Self {
        Self::with_capacity(storage, MEMORY_CAPACITY, RECENCY_WINDOW)
    }

    /// Create a memory store with explicit bounds.
    pub fn with_capacity(storage: Storage, capacity: usize, recency_window: usize) -> Self {
        Self {
            log: BoundedLog::new(storage, MEMORY_KEY, capacity),
            recency_window,
        }
    }

    /// Persist one insight record, stamping it with capture time.
    ///
    /// The caller-supplied timestamp is discarded; see [`InsightSource`].
    pub fn append(&self, mut record: InsightSource) -> Result<()> {
        record.timestamp = now_millis();
        self.log.append(record)
    }

    /// All retained records, oldest first.
    pub fn read_all(&self) -> Vec<InsightSource> {
        self.log.read_all()
    }

    /// Records for `stage_id` followed by the most-recent records overall.
    ///
    /// The two halves are concatenated without de-duplication — a record
    /// matching both appears twice. The duplication biases conversational
    /// context toward the current stage while preserving recency, and
    /// consumers rely on it.
    pub fn read_for_stage(&self, stage_id: &str) -> Vec<InsightSource> {
        let all = self.log.read_all();
        let mut result: Vec<InsightSource> = all
            .iter()
            .filter(|r| r.stage_id == stage_id)
            .cloned()
            .collect();

        let recent_start = all.len().saturating_sub(self.recency_window);
        result.extend_from_slice(&all[recent_start..]);
        result
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the buffer holds no records.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Drop every retained record.
    pub fn clear(&self) -> Result<()> {
        self.log.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightKind;

    fn make_store() -> MemoryStore {
        MemoryStore::new(Storage::in_memory())
    }

    fn make_record(stage_id: &str, content: &str) -> InsightSource {
        InsightSource::new(InsightKind::Chat, content, stage_id, "foundry-1")
    }

    #[test]
    fn test_append_and_read_all() {
        let store = make_store();
        store.append(make_record("ignite", "first")).unwrap();
        store.append(make_record("ignite", "second")).unwrap();

        let records = store.read_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "first");
        assert_eq!(records[1].content, "second");
    }

    #[test]
    fn test_append_stamps_capture_time() {
        let store = make_store();
        let mut record = make_record("ignite", "x");
        record.timestamp = 0;

        store.append(record).unwrap();
        assert!(store.read_all()[0].timestamp > 0);
    }

    #[test]
    fn test_capacity_evicts_oldest_and_preserves_order() {
        let store = make_store();
        for n in 0..51 {
            store
                .append(make_record("ignite", &format!("record-{}", n)))
                .unwrap();
        }

        let records = store.read_all();
        assert_eq!(records.len(), MEMORY_CAPACITY);
        assert_eq!(records[0].content, "record-1");
        assert_eq!(records[49].content, "record-50");
    }

    #[test]
    fn test_read_for_stage_duplicates_recent_stage_records() {
        let store = make_store();
        store.append(make_record("x", "for stage x")).unwrap();
        for n in 0..5 {
            store
                .append(make_record("other", &format!("noise-{}", n)))
                .unwrap();
        }

        // The stage record is among the 10 most recent, so it appears in
        // both halves of the biased read
        let records = store.read_for_stage("x");
        assert_eq!(records.len(), 7);
        let for_x = records.iter().filter(|r| r.stage_id == "x").count();
        assert_eq!(for_x, 2);
    }

    #[test]
    fn test_read_for_stage_outside_recency_window() {
        let store = make_store();
        store.append(make_record("x", "old stage record")).unwrap();
        for n in 0..10 {
            store
                .append(make_record("other", &format!("noise-{}", n)))
                .unwrap();
        }

        // Pushed out of the recency window, the stage record appears once
        let records = store.read_for_stage("x");
        assert_eq!(records.len(), 11);
        let for_x = records.iter().filter(|r| r.stage_id == "x").count();
        assert_eq!(for_x, 1);
        assert_eq!(records[0].content, "old stage record");
    }

    #[test]
    fn test_read_for_stage_on_small_buffer() {
        let store = make_store();
        store.append(make_record("x", "only")).unwrap();

        let records = store.read_for_stage("x");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "only");
        assert_eq!(records[1].content, "only");
    }

    #[test]
    fn test_clear() {
        let store = make_store();
        store.append(make_record("ignite", "x")).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
