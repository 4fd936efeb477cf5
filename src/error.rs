//! Error types shared across the engine

use std::path::PathBuf;

use thiserror::Error;

/// Why an import was aborted. Every variant ends the import; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Unreadable file, unsupported extension, malformed document or wrong shape
    #[error("invalid file")]
    InvalidFile,

    /// Missing version field, or a version other than 2.0.x / 3.0.x
    #[error("unsupported spec version")]
    InvalidVersion,

    /// A repository call signaled failure
    #[error("failed to persist imported entities: {0}")]
    ImportFailed(#[from] RepoError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ImportError {
    /// Text shown to the user for an import of `subject`. Details stay in the log.
    pub fn user_message(&self, subject: &str) -> String {
        match self {
            ImportError::InvalidFile => format!("Invalid {} file", subject),
            ImportError::InvalidVersion => "Only '2.0' and '3.0' specs are supported".to_string(),
            ImportError::ImportFailed(_) => format!("Failed to import the {}", subject),
            ImportError::Unexpected(_) => format!("Failed to import the {}; unexpected error", subject),
        }
    }
}

/// Failure reported by a repository collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("not found")]
    NotFound,

    #[error("duplicated name: {0}")]
    Duplicated(String),

    /// Parent folder missing, or the move would create a cycle
    #[error("invalid parent folder")]
    InvalidParent,

    /// Entity cannot be renamed or deleted
    #[error("{0} is protected")]
    Protected(String),

    #[error("storage error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RepoError {
    fn from(err: std::io::Error) -> Self {
        RepoError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(err: serde_yaml::Error) -> Self {
        RepoError::Io(err.to_string())
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure while sending a resolved request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("error reading body: {0}")]
    Body(String),

    #[error("cannot read {}: {message}", path.display())]
    File { path: PathBuf, message: String },

    #[error("{0} is not supported")]
    Unsupported(String),

    /// The actor already has a request in flight under this id
    #[error("request {0} is already in flight")]
    DuplicateId(u64),

    #[error("request cancelled")]
    Cancelled,
}
