//! Error types for fl-io.

use fl_network::NetworkError;
use thiserror::Error;

/// Errors that can occur when saving or loading networks and reports.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file parsed but describes an invalid network (duplicate or unknown
    /// ids, negative values).
    #[error("invalid network data: {0}")]
    Network(#[from] NetworkError),

    #[error("unsupported format: {0}")]
    Format(String),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
