pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

pub use application::{LedgerChanged, LedgerConfig, LedgerService, ProfileStore};
pub use domain::*;
pub use storage::{KeyValueStore, MemoryBackend, SqliteBackend, StorageBackend, StorageError};
