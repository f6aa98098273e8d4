//! Per-project stage progress
//!
//! Backs the external Kanban view: a per-project map from stage id to a
//! status. The coordinator only ever transitions an unset stage to
//! in-progress; every other transition belongs to the external view, and
//! an already-set status is never downgraded.

use crate::error::Result;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of per-project progress keys
pub const PROGRESS_KEY_PREFIX: &str = "stagesync.progress.";

/// Storage key of one project's progress map
pub fn progress_key(project_id: &str) -> String {
    format!("{}{}", PROGRESS_KEY_PREFIX, project_id)
}

/// Stage status as shown on the Kanban board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    InProgress,
    Done,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown stage status: {}", other)),
        }
    }
}

/// Per-project map of stage statuses
pub struct ProgressStore {
    storage: Storage,
}

impl ProgressStore {
    /// Create a progress store over the shared storage handle.
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Record that a stage has been touched by an insight.
    ///
    /// No-op when the stage already has a status. The project map is
    /// created lazily, so an unknown project is never an error.
    pub fn mark_touched(&self, project_id: &str, stage_id: &str) -> Result<()> {
        let key = progress_key(project_id);
        let mut board: BTreeMap<String, StageStatus> = self.storage.read_json(&key);
        if board.contains_key(stage_id) {
            return Ok(());
        }
        board.insert(stage_id.to_string(), StageStatus::InProgress);
        self.storage.write_json(&key, &board)
    }

    /// Unconditionally set a stage's status (the Kanban view's write path).
    pub fn set_status(
        &self,
        project_id: &str,
        stage_id: &str,
        status: StageStatus,
    ) -> Result<()> {
        let key = progress_key(project_id);
        let mut board: BTreeMap<String, StageStatus> = self.storage.read_json(&key);
        board.insert(stage_id.to_string(), status);
        self.storage.write_json(&key, &board)
    }

    /// A single stage's status.
    pub fn status(&self, project_id: &str, stage_id: &str) -> Option<StageStatus> {
        self.board(project_id).get(stage_id).copied()
    }

    /// The whole board for a project, keyed by stage id.
    pub fn board(&self, project_id: &str) -> BTreeMap<String, StageStatus> {
        self.storage.read_json(&progress_key(project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> ProgressStore {
        ProgressStore::new(Storage::in_memory())
    }

    #[test]
    fn test_mark_touched_sets_in_progress() {
        let store = make_store();
        store.mark_touched("foundry-1", "ignite").unwrap();
        assert_eq!(
            store.status("foundry-1", "ignite"),
            Some(StageStatus::InProgress)
        );
    }

    #[test]
    fn test_mark_touched_is_idempotent() {
        let store = make_store();
        store.mark_touched("foundry-1", "ignite").unwrap();
        store.mark_touched("foundry-1", "ignite").unwrap();
        assert_eq!(store.board("foundry-1").len(), 1);
    }

    #[test]
    fn test_mark_touched_never_downgrades() {
        let store = make_store();
        store.mark_touched("foundry-1", "ignite").unwrap();

        // The external Kanban view advances the stage...
        store
            .set_status("foundry-1", "ignite", StageStatus::Done)
            .unwrap();

        // ...and a later insight must not pull it back
        store.mark_touched("foundry-1", "ignite").unwrap();
        assert_eq!(store.status("foundry-1", "ignite"), Some(StageStatus::Done));
    }

    #[test]
    fn test_unknown_project_reads_empty() {
        let store = make_store();
        assert!(store.board("nowhere").is_empty());
        assert!(store.status("nowhere", "ignite").is_none());
    }

    #[test]
    fn test_projects_are_isolated() {
        let store = make_store();
        store.mark_touched("foundry-1", "ignite").unwrap();
        store.mark_touched("launch-2", "validate").unwrap();

        assert_eq!(store.board("foundry-1").len(), 1);
        assert_eq!(store.board("launch-2").len(), 1);
        assert!(store.status("launch-2", "ignite").is_none());
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&StageStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(serde_json::to_string(&StageStatus::Done).unwrap(), "\"done\"");
        assert_eq!(
            "in-progress".parse::<StageStatus>().unwrap(),
            StageStatus::InProgress
        );
        assert!("paused".parse::<StageStatus>().is_err());
    }
}
