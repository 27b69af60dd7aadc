mod backend;
mod error;
mod memory;
mod sqlite;
mod store;

pub use backend::*;
pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use store::*;

/// SQL migration for the key-value table
pub const MIGRATION_001_KV_STORE: &str = include_str!("migrations/001_kv_store.sql");
