//! Stage note documents
//!
//! One rich-text note document per stage, kept in a single global
//! collection and looked up by the derived id `stage-<stage_id>`. The only
//! mutation is [`NoteStore::upsert`], whose merge policy is the observable
//! heart of the engine: first content replaces the placeholder, later
//! content appends behind a horizontal rule.

use crate::error::Result;
use crate::insight::OsKind;
use crate::richtext::Fragment;
use crate::storage::{now_millis, Storage};
use serde::{Deserialize, Serialize};

/// Storage key of the global notes collection
pub const NOTES_KEY: &str = "stagesync.notes";

/// Derived note document id for a stage
pub fn note_id(stage_id: &str) -> String {
    format!("stage-{}", stage_id)
}

/// A per-stage rich-text note document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDocument {
    pub id: String,
    pub title: String,
    pub content: Fragment,
    pub created_at: u64,
    pub updated_at: u64,
    pub project_id: String,
    pub stage_id: String,
    /// Product track, assigned when the document is first created and never
    /// overwritten by later insights from a differently-classified project.
    pub system: OsKind,
}

/// Keyed store of note documents with create-or-append semantics
pub struct NoteStore {
    storage: Storage,
}

impl NoteStore {
    /// Create a note store over the shared storage handle.
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// All note documents, in creation order.
    pub fn all(&self) -> Vec<NoteDocument> {
        self.storage.read_json(NOTES_KEY)
    }

    /// The note document for `stage_id`, if one exists.
    pub fn get(&self, stage_id: &str) -> Option<NoteDocument> {
        let id = note_id(stage_id);
        self.all().into_iter().find(|n| n.id == id)
    }

    /// Create the stage's document or append to it.
    ///
    /// A fresh document takes `fragment` as its content. An existing
    /// document still holding the empty placeholder is replaced outright;
    /// otherwise the fragment is appended behind a horizontal rule —
    /// repeated captures are distinct events, so appends are never
    /// deduplicated. `project_id` always follows the most recent caller;
    /// `system` keeps its first classification.
    pub fn upsert(
        &self,
        stage_id: &str,
        project_id: &str,
        os: OsKind,
        fragment: Fragment,
    ) -> Result<NoteDocument> {
        let mut notes: Vec<NoteDocument> = self.storage.read_json(NOTES_KEY);
        let id = note_id(stage_id);
        let now = now_millis();

        let doc = match notes.iter_mut().find(|n| n.id == id) {
            Some(doc) => {
                if doc.content.is_placeholder() {
                    doc.content = fragment;
                } else {
                    doc.content.append_separated(fragment);
                }
                // The millisecond clock may not advance between rapid appends
                doc.updated_at = now.max(doc.updated_at + 1);
                doc.project_id = project_id.to_string();
                doc.clone()
            }
            None => {
                let doc = NoteDocument {
                    id,
                    title: format!("Stage: {}", stage_id),
                    content: fragment,
                    created_at: now,
                    updated_at: now,
                    project_id: project_id.to_string(),
                    stage_id: stage_id.to_string(),
                    system: os,
                };
                notes.push(doc.clone());
                doc
            }
        };

        self.storage.write_json(NOTES_KEY, &notes)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{to_document, Block};
    use crate::storage::{MemoryMedium, StorageMedium};
    use std::sync::Arc;

    fn make_store() -> NoteStore {
        NoteStore::new(Storage::in_memory())
    }

    #[test]
    fn test_upsert_creates_document() {
        let store = make_store();
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("hello"))
            .unwrap();

        assert_eq!(doc.id, "stage-ignite");
        assert_eq!(doc.title, "Stage: ignite");
        assert_eq!(doc.stage_id, "ignite");
        assert_eq!(doc.project_id, "foundry-1");
        assert_eq!(doc.system, OsKind::FoundryOs);
        assert_eq!(doc.created_at, doc.updated_at);
        assert!(doc.created_at > 0);

        let fetched = store.get("ignite").unwrap();
        assert_eq!(fetched.id, doc.id);
    }

    #[test]
    fn test_get_unknown_stage_is_none() {
        let store = make_store();
        assert!(store.get("ignite").is_none());
    }

    #[test]
    fn test_first_real_content_replaces_placeholder_without_separator() {
        let store = make_store();
        // An empty capture leaves the placeholder behind
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document(""))
            .unwrap();

        let fragment = to_document("real content");
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, fragment.clone())
            .unwrap();

        assert_eq!(doc.content, fragment);
        assert!(!doc.content.blocks.contains(&Block::Rule));
    }

    #[test]
    fn test_second_insight_appends_behind_rule() {
        let store = make_store();
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("first"))
            .unwrap();
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("second"))
            .unwrap();

        assert_eq!(doc.content.blocks.len(), 3);
        assert_eq!(doc.content.blocks[1], Block::Rule);
        assert_eq!(doc.content.to_plain_text(), "first\n---\nsecond\n");
    }

    #[test]
    fn test_identical_appends_are_distinct_events() {
        let store = make_store();
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("same"))
            .unwrap();
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("same"))
            .unwrap();

        assert_eq!(doc.content.to_plain_text(), "same\n---\nsame\n");
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let store = make_store();
        let first = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("a"))
            .unwrap();
        let second = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("b"))
            .unwrap();

        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_system_is_never_reclassified() {
        let store = make_store();
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("a"))
            .unwrap();
        let doc = store
            .upsert("ignite", "launch-9", OsKind::LaunchOs, to_document("b"))
            .unwrap();

        // Most recent caller wins for the project, never for the track
        assert_eq!(doc.project_id, "launch-9");
        assert_eq!(doc.system, OsKind::FoundryOs);
    }

    #[test]
    fn test_one_document_per_stage() {
        let store = make_store();
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("a"))
            .unwrap();
        store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("b"))
            .unwrap();
        store
            .upsert("validate", "foundry-1", OsKind::FoundryOs, to_document("c"))
            .unwrap();

        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn test_corrupt_collection_reads_as_empty() {
        let medium = Arc::new(MemoryMedium::new());
        medium.store(NOTES_KEY, "{{{ definitely not json").unwrap();

        let store = NoteStore::new(Storage::new(medium));
        assert!(store.all().is_empty());

        // A fresh upsert starts the collection over
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("a"))
            .unwrap();
        assert_eq!(doc.id, "stage-ignite");
    }

    #[test]
    fn test_document_serialization_shape() {
        let store = make_store();
        let doc = store
            .upsert("ignite", "foundry-1", OsKind::FoundryOs, to_document("- a"))
            .unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"id\":\"stage-ignite\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"system\":\"foundryos\""));
    }
}
