//! Error types for the pressure-watcher service

/// Errors that can occur in the pressure-watcher service
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Gauge reader error: {0}")]
    Gauge(String),

    #[error("Upload error: {0}")]
    Upload(String),
}

/// Result type alias for pressure-watcher operations
pub type Result<T> = std::result::Result<T, WatcherError>;
