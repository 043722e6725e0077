use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

// Enum for handling various application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError), // Errors from the persistence backend.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to data serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("Could not read the imported file: {0}")]
    MalformedImport(serde_json::Error), // The import was not valid JSON at all.

    #[error("Image too large ({size} bytes). Maximum is {limit} bytes.")]
    PhotoTooLarge { size: u64, limit: u64 },

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Background write task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Join(err.to_string())
    }
}
