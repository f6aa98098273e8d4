//! Sync coordinator
//!
//! The only public mutation entry point. Every incoming insight is applied
//! in a fixed order: format, note upsert, progress mark, memory append,
//! continuity append, then a re-read of the just-written note and a change
//! publish. Failures are isolated per step: a failed step is logged,
//! recorded in the report, and never aborts the steps after it, so one call
//! can partially succeed and leave the stores inconsistent with each other.
//! There is no retry and no rollback.

use crate::config::StageSyncConfig;
use crate::continuity::{ContinuityRecord, ContinuityStore};
use crate::error::{Error, Result};
use crate::insight::InsightSource;
use crate::memory::MemoryStore;
use crate::notes::{note_id, NoteStore};
use crate::notify::{ChangeNotifier, NoteChange};
use crate::progress::ProgressStore;
use crate::richtext;
use crate::storage::Storage;
use serde::Serialize;

/// One propagation step of `add_insight`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Note,
    Progress,
    Memory,
    Continuity,
    Publish,
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Progress => write!(f, "progress"),
            Self::Memory => write!(f, "memory"),
            Self::Continuity => write!(f, "continuity"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

/// Outcome of one propagation step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: SyncStep,
    /// The swallowed failure, when the step did not apply
    pub error: Option<String>,
}

/// Aggregated outcome of one `add_insight` call.
///
/// Fire-and-forget callers can drop it; callers that care about partial
/// propagation inspect the per-step results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub note_id: String,
    pub steps: Vec<StepReport>,
}

impl SyncReport {
    fn new(note_id: String) -> Self {
        Self {
            note_id,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, step: SyncStep, outcome: Result<()>) {
        let error = match outcome {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Sync step {} failed for {}: {}", step, self.note_id, e);
                Some(e.to_string())
            }
        };
        self.steps.push(StepReport { step, error });
    }

    /// Whether every step applied.
    pub fn fully_applied(&self) -> bool {
        self.steps.iter().all(|s| s.error.is_none())
    }

    /// The steps that failed to apply.
    pub fn failed_steps(&self) -> Vec<SyncStep> {
        self.steps
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.step)
            .collect()
    }
}

/// Orchestrates the formatter, the four stores, and the notifier
pub struct SyncCoordinator {
    notes: NoteStore,
    progress: ProgressStore,
    memory: MemoryStore,
    continuity: ContinuityStore,
    notifier: ChangeNotifier,
}

impl SyncCoordinator {
    /// Build a coordinator with default store bounds over a shared storage
    /// handle.
    pub fn new(storage: Storage) -> Self {
        Self::with_config(storage, &StageSyncConfig::default())
    }

    /// Build a coordinator with configured store bounds.
    pub fn with_config(storage: Storage, config: &StageSyncConfig) -> Self {
        Self {
            notes: NoteStore::new(storage.clone()),
            progress: ProgressStore::new(storage.clone()),
            memory: MemoryStore::with_capacity(
                storage.clone(),
                config.memory.capacity,
                config.memory.recency_window,
            ),
            continuity: ContinuityStore::with_capacity(storage, config.continuity.capacity),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Propagate one captured insight into every store, then announce it.
    ///
    /// Steps run in a fixed order and each failure is recorded without
    /// aborting the rest.
    pub fn add_insight(&self, source: InsightSource) -> SyncReport {
        let mut report = SyncReport::new(note_id(&source.stage_id));
        let fragment = richtext::to_document(&source.content);

        report.record(
            SyncStep::Note,
            self.notes
                .upsert(&source.stage_id, &source.project_id, source.os, fragment)
                .map(|_| ()),
        );
        report.record(
            SyncStep::Progress,
            self.progress.mark_touched(&source.project_id, &source.stage_id),
        );
        report.record(SyncStep::Memory, self.memory.append(source.clone()));
        report.record(
            SyncStep::Continuity,
            self.continuity
                .record_visit(&source.stage_id, &source.project_id, source.os),
        );

        // Publish the re-read persisted state rather than the value computed
        // by the upsert above: another writer sharing the medium may have
        // touched the document in between, and observers must see what is
        // actually stored.
        let published = match self.notes.get(&source.stage_id) {
            Some(note) => {
                self.notifier.publish(&NoteChange::update(note));
                Ok(())
            }
            None => Err(Error::Note(format!(
                "{} missing on re-read",
                report.note_id
            ))),
        };
        report.record(SyncStep::Publish, published);

        report
    }

    /// Conversational context for the completion backend.
    ///
    /// With a stage, the stage-biased list from the memory store; without,
    /// the whole retained buffer.
    pub fn memory_for_llm(&self, stage_id: Option<&str>) -> Vec<InsightSource> {
        match stage_id {
            Some(stage) => self.memory.read_for_stage(stage),
            None => self.memory.read_all(),
        }
    }

    /// The cross-stage continuity trail, oldest first.
    pub fn stage_context(&self) -> Vec<ContinuityRecord> {
        self.continuity.read_all()
    }

    /// Empty the memory and continuity buffers.
    ///
    /// Used for test isolation; notes and progress are left untouched.
    pub fn clear(&self) -> Result<()> {
        self.memory.clear()?;
        self.continuity.clear()
    }

    /// The change notifier observers register with.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Read access to the note documents.
    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Read and Kanban write access to stage progress.
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }
}
