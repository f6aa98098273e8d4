//! StageSync error types

use thiserror::Error;

/// StageSync error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage medium error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Note store error
    #[error("Note error: {0}")]
    Note(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for StageSync operations
pub type Result<T> = std::result::Result<T, Error>;
