/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `set` was called for a key that already holds data.
    #[error("key already exists: {0}")]
    KeyExists(String),

    /// No data is stored under the key.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The key is not a valid relative path.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for blob store operations.
pub type StoreResult<T> = Result<T, StoreError>;
