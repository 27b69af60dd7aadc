use thiserror::Error;

/// Failure result returned by the key-value store. Every variant carries the
/// key involved and a human-readable reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage I/O failed for '{key}': {reason}")]
    Io { key: String, reason: String },

    #[error("Failed to serialize value for '{key}': {reason}")]
    Serialize { key: String, reason: String },

    #[error("Failed to parse stored value for '{key}': {reason}")]
    Parse { key: String, reason: String },
}

impl StorageError {
    pub(crate) fn io(key: impl Into<String>, err: &anyhow::Error) -> Self {
        StorageError::Io {
            key: key.into(),
            reason: format!("{:#}", err),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StorageError::Io { key, .. }
            | StorageError::Serialize { key, .. }
            | StorageError::Parse { key, .. } => key,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
