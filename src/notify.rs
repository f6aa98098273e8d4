//! Change notification channel
//!
//! Announces the latest persisted state of an affected note to registered
//! observers, decoupled from the stores' own persistence. Delivery is
//! synchronous, in registration order, on the publishing thread. There is
//! no buffering: an observer registered after a publish never sees it.

use crate::notes::NoteDocument;
use crate::storage::now_millis;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// What happened to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Update,
}

/// Payload delivered to note observers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub note_id: String,
    pub note: NoteDocument,
    pub timestamp: u64,
}

impl NoteChange {
    /// An update announcement carrying the note's latest persisted state.
    pub fn update(note: NoteDocument) -> Self {
        Self {
            kind: ChangeKind::Update,
            note_id: note.id.clone(),
            note,
            timestamp: now_millis(),
        }
    }
}

/// Opaque handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(Uuid);

type Callback = Arc<dyn Fn(&NoteChange) + Send + Sync>;

/// Publish/subscribe channel for note changes
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<(SubscriberId, Callback)>>,
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; returns the handle needed to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&NoteChange) + Send + Sync + 'static,
    {
        let id = SubscriberId(Uuid::new_v4());
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a previously-registered observer. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(sid, _)| *sid != id);
    }

    /// Deliver `change` to every current subscriber, in registration order.
    ///
    /// The list is snapshotted before delivery so a callback may subscribe
    /// or unsubscribe without deadlocking; a registration made during an
    /// in-flight publish still misses it.
    pub fn publish(&self, change: &NoteChange) {
        let snapshot: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in snapshot {
            callback(change);
        }
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}
