// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use pennywise::application::{LedgerConfig, LedgerService};
use pennywise::domain::{Balance, Transaction, find_category};
use pennywise::storage::{MemoryBackend, SqliteBackend};
use tempfile::TempDir;

/// Helper to create a test service backed by a temporary SQLite file
pub async fn sqlite_service() -> Result<(LedgerService<SqliteBackend>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = open_in(&temp_dir, LedgerConfig::default()).await?;
    Ok((service, temp_dir))
}

/// Open (or reopen) the ledger database inside `dir`
pub async fn open_in(dir: &TempDir, config: LedgerConfig) -> Result<LedgerService<SqliteBackend>> {
    let db_path = dir.path().join("test.db");
    let service = LedgerService::open(db_path.to_str().unwrap(), config).await?;
    Ok(service)
}

/// In-memory ledger with the demo seed
pub fn memory_service() -> LedgerService<MemoryBackend> {
    LedgerService::in_memory(LedgerConfig::default())
}

/// In-memory ledger whose balance starts at zero
pub fn zero_seed_service() -> LedgerService<MemoryBackend> {
    LedgerService::in_memory(LedgerConfig::default().with_seed(Balance::zero()))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Test fixture: a typical month of activity
pub struct SampleMonth;

impl SampleMonth {
    pub fn transactions() -> Vec<Transaction> {
        vec![
            Transaction::income("Salary", 420_000)
                .with_id("salary")
                .with_date(parse_date("2024-03-01")),
            Transaction::expense("Rent", 150_000)
                .with_id("rent")
                .with_category(find_category("bills").unwrap())
                .with_date(parse_date("2024-03-02")),
            Transaction::expense("Groceries", 8_450)
                .with_id("groceries")
                .with_category(find_category("food").unwrap())
                .with_date(parse_date("2024-03-05")),
            Transaction::income("Freelance", 60_000)
                .with_id("freelance")
                .with_date(parse_date("2024-03-10")),
            Transaction::expense("Train pass", 9_900)
                .with_id("train")
                .with_category(find_category("transportation").unwrap())
                .with_date(parse_date("2024-03-11")),
        ]
    }

    pub async fn record<B: pennywise::storage::StorageBackend>(
        service: &LedgerService<B>,
    ) -> Result<()> {
        for txn in Self::transactions() {
            service.add(txn).await?;
        }
        Ok(())
    }
}
