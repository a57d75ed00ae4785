use crate::id::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by filesystem operations.
///
/// Expected absence (unknown id, bind or name) is not an error: lookups
/// return `Option` or an empty list instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Not a folder: {0}")]
    NotAFolder(NodeId),

    #[error("Not a file: {0}")]
    NotAFile(NodeId),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// The mutation committed but the following persist step failed.
    /// Retrying the mutation would apply it twice; retry [`crate::FS::persist`].
    #[error("Committed but not persisted: {0}")]
    Unpersisted(String),

    #[error("Snapshot line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Invalid binary literal: {0}")]
    InvalidBlob(String),

    #[error("Media conversion failed: {0}")]
    Media(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn format<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Format {
            line,
            message: message.into(),
        }
    }

    pub fn transaction<S: std::fmt::Display>(cause: S) -> Self {
        Error::Transaction(cause.to_string())
    }

    pub fn storage_unavailable<S: std::fmt::Display>(cause: S) -> Self {
        Error::StorageUnavailable(cause.to_string())
    }
}
