use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use tokio::sync::RwLock;

use super::{BatchOp, StorageBackend};

/// In-process backend. Nothing survives the process; used for tests and
/// throwaway sessions.
#[derive(Default)]
pub struct MemoryBackend {
    slots: RwLock<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail until switched off again.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write, delete or clear fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store raw text without going through JSON encoding.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("simulated read failure");
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("simulated write failure");
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        self.check_read()?;
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.check_write()?;
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn apply(&self, ops: &[BatchOp]) -> Result<()> {
        self.check_write()?;
        let mut slots = self.slots.write().await;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    slots.insert(key.clone(), value.clone());
                }
                BatchOp::Delete { key } => {
                    slots.remove(key);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_write()?;
        self.slots.write().await.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<()> {
        self.check_write()?;
        let mut slots = self.slots.write().await;
        for key in keys {
            slots.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check_write()?;
        self.slots.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.check_read()?;
        Ok(self.slots.read().await.keys().cloned().collect())
    }
}
