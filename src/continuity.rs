//! Stage-continuity trail
//!
//! A bounded breadcrumb log of stage visits, shared across all projects,
//! used to carry narrative context across stage transitions.

use crate::error::Result;
use crate::insight::OsKind;
use crate::storage::{BoundedLog, Storage};
use serde::{Deserialize, Serialize};

/// Storage key of the global continuity log
pub const CONTINUITY_KEY: &str = "stagesync.continuity";

/// Default retained record capacity
pub const CONTINUITY_CAPACITY: usize = 20;

/// One breadcrumb of a stage visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityRecord {
    pub stage_id: String,
    pub project_id: String,
    /// Stage id with its first character capitalized, for display
    pub stage_name: String,
    pub os_type: OsKind,
}

/// Display name of a stage: the id with its first character capitalized.
pub fn stage_display_name(stage_id: &str) -> String {
    let mut chars = stage_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bounded log of stage visits
pub struct ContinuityStore {
    log: BoundedLog<ContinuityRecord>,
}

impl ContinuityStore {
    /// Create a continuity store with the default capacity.
    pub fn new(storage: Storage) -> Self {
        Self::with_capacity(storage, CONTINUITY_CAPACITY)
    }

    /// Create a continuity store with an explicit capacity.
    pub fn with_capacity(storage: Storage, capacity: usize) -> Self {
        Self {
            log: BoundedLog::new(storage, CONTINUITY_KEY, capacity),
        }
    }

    /// Record a visit to a stage.
    pub fn record_visit(&self, stage_id: &str, project_id: &str, os: OsKind) -> Result<()> {
        self.log.append(ContinuityRecord {
            stage_id: stage_id.to_string(),
            project_id: project_id.to_string(),
            stage_name: stage_display_name(stage_id),
            os_type: os,
        })
    }

    /// All retained records, oldest first.
    pub fn read_all(&self) -> Vec<ContinuityRecord> {
        self.log.read_all()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the trail holds no records.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Drop every retained record.
    pub fn clear(&self) -> Result<()> {
        self.log.clear()
    }
}
