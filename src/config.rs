//! StageSync configuration management

use crate::continuity::CONTINUITY_CAPACITY;
use crate::error::{Error, Result};
use crate::memory::{MEMORY_CAPACITY, RECENCY_WINDOW};
use crate::storage::FileMedium;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main StageSync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSyncConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Memory buffer configuration
    pub memory: MemoryConfig,

    /// Continuity trail configuration
    pub continuity: ContinuityConfig,
}

impl StageSyncConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per collection under the data directory
    #[default]
    File,

    /// In-process only, nothing persisted
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to persist collections with
    pub backend: StorageBackend,

    /// Data directory for the file backend (defaults to `~/.stagesync`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: None,
        }
    }
}

impl StorageConfig {
    /// The data directory to use, falling back to the default.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FileMedium::default_dir)
    }
}

/// Memory buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Retained record capacity
    pub capacity: usize,

    /// Most-recent records always included in stage-biased reads
    pub recency_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: MEMORY_CAPACITY,
            recency_window: RECENCY_WINDOW,
        }
    }
}

/// Continuity trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuityConfig {
    /// Retained record capacity
    pub capacity: usize,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            capacity: CONTINUITY_CAPACITY,
        }
    }
}
