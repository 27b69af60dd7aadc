use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::io::Read;

use crate::application::{AppError, LedgerService};
use crate::domain::{Transaction, TransactionType, find_category, parse_cents};
use crate::io::export::LedgerSnapshot;
use crate::storage::StorageBackend;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub skip_duplicates: bool,
}

/// Importer for loading data into the ledger
pub struct Importer<'a, B> {
    service: &'a LedgerService<B>,
}

impl<'a, B: StorageBackend> Importer<'a, B> {
    pub fn new(service: &'a LedgerService<B>) -> Self {
        Self { service }
    }

    /// Import transactions from CSV in the layout written by the exporter.
    /// Rows are added oldest first so the ledger ends up newest first again.
    pub async fn import_transactions_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();
        let mut parsed = Vec::new();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            match parse_record(&record) {
                Ok(txn) => parsed.push((line, txn)),
                Err((field, error)) => result.errors.push(ImportError {
                    line,
                    field: Some(field.to_string()),
                    error,
                }),
            }
        }

        for (line, txn) in parsed.into_iter().rev() {
            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.service.add(txn).await {
                Ok(_) => result.imported += 1,
                Err(AppError::DuplicateTransaction(id)) if options.skip_duplicates => {
                    tracing::debug!(id = %id, "Skipping duplicate transaction");
                    result.skipped += 1;
                }
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(result)
    }

    /// Replace the ledger with a JSON snapshot written by the exporter.
    pub async fn import_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;
        let count = snapshot.transactions.len();

        if !options.dry_run {
            self.service.restore(snapshot.into()).await?;
        }

        Ok(ImportResult {
            imported: count,
            ..ImportResult::default()
        })
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<Transaction, (&'static str, String)> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let id = field(0);
    let title = field(1);
    if title.is_empty() {
        return Err(("title", "Title is required".to_string()));
    }

    let kind = TransactionType::from_str(field(2))
        .ok_or_else(|| ("type", format!("Unknown transaction type: {}", field(2))))?;
    let amount = parse_cents(field(3)).map_err(|e| ("amount", e.to_string()))?;

    let mut txn = Transaction::new(title, amount, kind);
    if !id.is_empty() {
        txn = txn.with_id(id);
    }

    let category = field(4);
    if !category.is_empty() {
        let found =
            find_category(category).ok_or_else(|| ("category", format!("Unknown category: {}", category)))?;
        txn = txn.with_category(found);
    }

    if !field(5).is_empty() {
        txn.date = parse_timestamp(field(5)).map_err(|e| ("date", e.to_string()))?;
    }
    if !field(6).is_empty() {
        txn.created_at = parse_timestamp(field(6)).map_err(|e| ("created_at", e.to_string()))?;
    }

    Ok(txn)
}

// Helper function to parse timestamp
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Then a bare YYYY-MM-DD at midnight
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    anyhow::bail!("Invalid timestamp format: {}", s)
}
