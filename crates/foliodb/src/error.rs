use foliofs::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum FolioDbError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] foliofs::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Blob missing for {id} at {path}")]
    MissingBlob { id: NodeId, path: String },

    #[error("Unknown node type {kind} for {id}")]
    UnknownKind { id: NodeId, kind: String },
}

pub type Result<T> = std::result::Result<T, FolioDbError>;

impl FolioDbError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        FolioDbError::Config {
            message: message.into(),
        }
    }
}

impl From<FolioDbError> for foliofs::Error {
    fn from(e: FolioDbError) -> Self {
        match e {
            FolioDbError::Fs(inner) => inner,
            FolioDbError::Io(inner) => foliofs::Error::Io(inner),
            FolioDbError::Json(inner) => foliofs::Error::Json(inner),
            FolioDbError::DuckDb(inner) => foliofs::Error::transaction(inner),
            FolioDbError::Transaction { message } => foliofs::Error::Transaction(message),
            FolioDbError::ObjectStore(inner) => foliofs::Error::storage_unavailable(inner),
            other @ (FolioDbError::MissingBlob { .. } | FolioDbError::Config { .. }) => {
                foliofs::Error::storage_unavailable(other)
            }
            other => foliofs::Error::Other(other.to_string()),
        }
    }
}
