use anyhow::Result;

/// One change inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: String, value: String },
    Delete { key: String },
}

impl BatchOp {
    pub fn key(&self) -> &str {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Raw text slots addressed by string keys.
///
/// Backends only move strings around; JSON encoding lives in
/// [`KeyValueStore`](super::KeyValueStore). The multi-key operations must be
/// all-or-nothing: either every entry is applied or none is.
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a single value.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Apply puts and deletes in order, atomically.
    async fn apply(&self, ops: &[BatchOp]) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove several values atomically.
    async fn delete_many(&self, keys: &[&str]) -> Result<()>;

    /// Remove every value.
    async fn clear(&self) -> Result<()>;

    /// All keys currently present, sorted.
    async fn keys(&self) -> Result<Vec<String>>;
}
