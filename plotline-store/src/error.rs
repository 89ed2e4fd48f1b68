//! Error types for the plot store.

use thiserror::Error;

/// All errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("unauthorized access to {kind} {id}")]
    Unauthorized { kind: &'static str, id: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`StoreError`] for callers that map errors to
/// transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidState,
    InvalidInput,
    Conflict,
    Backend,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UsernameTaken(_) => ErrorKind::Conflict,
            Self::DuckDb(_) | Self::Json(_) | Self::Io(_) => ErrorKind::Backend,
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn unauthorized(kind: &'static str, id: impl ToString) -> Self {
        Self::Unauthorized {
            kind,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
