//! Error types for manuscript export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned by a sink that cannot take a paragraph.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("sink rejected paragraph {index}: {reason}")]
    Sink { index: usize, reason: String },
}

pub type ExportResult<T> = Result<T, ExportError>;
