/// All errors that can be returned by a storage backend or the draft layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key contains characters outside `[A-Za-z0-9_.-]` or is empty.
    #[error("invalid storage key: {key:?}")]
    InvalidKey { key: String },

    /// A filesystem operation failed.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be decoded as a draft record.
    #[error("malformed draft record: {0}")]
    Malformed(String),

    /// A backend-specific failure (poisoned lock, quota, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
