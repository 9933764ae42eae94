//! Storage error types shared across crates

/// Standard result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore)
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
