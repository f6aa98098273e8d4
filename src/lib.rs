//! StageSync — local multi-store synchronization engine
//!
//! StageSync takes one piece of captured information (an "insight": a chat
//! excerpt, an AI-generated summary, or a manually entered note) and
//! propagates it consistently into several independently-queried persisted
//! views: a rich-text note document per stage, a per-project stage-progress
//! map, a bounded conversational-memory buffer, and a bounded
//! stage-continuity trail. Registered observers are then told that state
//! has changed.
//!
//! ## Architecture
//!
//! ```text
//! caller ──▶ SyncCoordinator::add_insight
//!               │
//!               ├─▶ richtext::to_document ─▶ NoteStore::upsert
//!               ├─▶ ProgressStore::mark_touched
//!               ├─▶ MemoryStore::append          (capacity 50, FIFO)
//!               ├─▶ ContinuityStore::record_visit (capacity 20, FIFO)
//!               └─▶ re-read note ─▶ ChangeNotifier::publish
//! ```
//!
//! All stores share one injected [`storage::StorageMedium`] but own
//! disjoint keys, so cross-store writes never conflict. Same-key writes
//! from independent engines sharing a medium race with last-writer-wins
//! semantics — a documented, accepted limitation. Step failures inside
//! [`sync::SyncCoordinator::add_insight`] are isolated: each one is logged
//! and recorded in the returned [`sync::SyncReport`] without aborting the
//! steps after it.
//!
//! ## Modules
//!
//! - [`sync`]: the coordinator, the only public mutation entry point
//! - [`richtext`]: pure text-to-fragment formatter
//! - [`notes`]: per-stage rich-text note documents
//! - [`progress`]: per-project stage status map
//! - [`memory`]: bounded conversational-memory buffer
//! - [`continuity`]: bounded stage-continuity trail
//! - [`notify`]: synchronous change notification channel
//! - [`storage`]: injected storage media and the mutation broadcast
//! - [`config`]: configuration management

pub mod config;
pub mod continuity;
pub mod error;
pub mod insight;
pub mod memory;
pub mod notes;
pub mod notify;
pub mod progress;
pub mod richtext;
pub mod storage;
pub mod sync;

pub use config::StageSyncConfig;
pub use error::{Error, Result};
pub use insight::{InsightKind, InsightSource, OsKind};
pub use sync::{SyncCoordinator, SyncReport};
