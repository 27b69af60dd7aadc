use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::{BatchOp, StorageBackend, StorageError, StorageResult};

/// A set of changes applied together with [`KeyValueStore::commit`].
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `value` under `key`, serializing it now.
    pub fn put<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> StorageResult<Self> {
        let value = encode(key, value)?;
        self.ops.push(BatchOp::Put {
            key: key.to_string(),
            value,
        });
        Ok(self)
    }

    /// Queue removal of `key`.
    pub fn remove(mut self, key: &str) -> Self {
        self.ops.push(BatchOp::Delete {
            key: key.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// JSON values stored under string keys.
///
/// Every operation returns a [`StorageResult`]; backend and encoding failures
/// are logged here and handed back to the caller as values.
pub struct KeyValueStore<B> {
    backend: B,
}

impl<B: StorageBackend> KeyValueStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serialize and store `value`, handing it back on success.
    pub async fn set<T: Serialize>(&self, key: &str, value: T) -> StorageResult<T> {
        let json = encode(key, &value)?;
        self.backend.write(key, &json).await.map_err(|e| {
            error!(key, error = %e, "Error saving data");
            StorageError::io(key, &e)
        })?;
        debug!(key, bytes = json.len(), "Saved value");
        Ok(value)
    }

    /// Load and parse the value under `key`. A missing key is `Ok(None)`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let raw = self.backend.read(key).await.map_err(|e| {
            error!(key, error = %e, "Error getting data");
            StorageError::io(key, &e)
        })?;

        match raw {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                error!(key, error = %e, "Stored value is not valid");
                StorageError::Parse {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        self.backend.delete(key).await.map_err(|e| {
            error!(key, error = %e, "Error removing data");
            StorageError::io(key, &e)
        })
    }

    /// Remove several keys in one atomic step.
    pub async fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        self.backend.delete_many(keys).await.map_err(|e| {
            let joined = keys.join(",");
            error!(keys = %joined, error = %e, "Error removing data");
            StorageError::io(joined, &e)
        })
    }

    /// Whether `key` holds a value. Read failures count as absent.
    pub async fn has(&self, key: &str) -> bool {
        match self.backend.read(key).await {
            Ok(value) => value.is_some(),
            Err(e) => {
                error!(key, error = %e, "Error checking key");
                false
            }
        }
    }

    pub async fn clear(&self) -> StorageResult<()> {
        self.backend.clear().await.map_err(|e| {
            error!(error = %e, "Error clearing storage");
            StorageError::io("*", &e)
        })
    }

    pub async fn keys(&self) -> StorageResult<Vec<String>> {
        self.backend.keys().await.map_err(|e| {
            error!(error = %e, "Error getting all keys");
            StorageError::io("*", &e)
        })
    }

    /// Apply every change in `batch` atomically.
    pub async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.backend.apply(&batch.ops).await.map_err(|e| {
            let keys = batch
                .ops
                .iter()
                .map(BatchOp::key)
                .collect::<Vec<_>>()
                .join(",");
            error!(keys = %keys, error = %e, "Error saving batch");
            StorageError::io(keys, &e)
        })?;
        debug!(changes = batch.len(), "Committed batch");
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
