use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{LedgerService, LedgerState};
use crate::domain::{Balance, Transaction, format_cents};
use crate::storage::StorageBackend;

/// Ledger snapshot for full export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

impl From<LedgerSnapshot> for LedgerState {
    fn from(snapshot: LedgerSnapshot) -> Self {
        LedgerState {
            transactions: snapshot.transactions,
            balance: snapshot.balance,
        }
    }
}

pub const CSV_HEADER: [&str; 7] = [
    "id",
    "title",
    "type",
    "amount",
    "category",
    "date",
    "created_at",
];

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a, B> {
    service: &'a LedgerService<B>,
}

impl<'a, B: StorageBackend> Exporter<'a, B> {
    pub fn new(service: &'a LedgerService<B>) -> Self {
        Self { service }
    }

    /// Export transactions to CSV, newest first
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let state = self.service.snapshot().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;

        for txn in &state.transactions {
            csv_writer.write_record(&[
                txn.id.clone(),
                txn.title.clone(),
                txn.kind.as_str().to_string(),
                format_cents(txn.amount),
                txn.category
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                txn.date.to_rfc3339(),
                txn.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(state.transactions.len())
    }

    /// Export both ledger records as a JSON snapshot
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let state = self.service.snapshot().await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            transactions: state.transactions,
            balance: state.balance,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
