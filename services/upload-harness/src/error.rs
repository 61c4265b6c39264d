//! Error types for the upload harness

use pressure_watcher::WatcherError;

/// Errors that can occur while exercising the upload endpoint
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] WatcherError),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("Image encoding failed: {0}")]
    Image(String),

    #[error("Please select a valid image file")]
    InvalidFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
