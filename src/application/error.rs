use thiserror::Error;

use crate::domain::{BalanceOverflow, Cents};
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(String),

    #[error("Invalid amount for transaction {id}: {amount}")]
    InvalidAmount { id: String, amount: Cents },

    #[error("No user data found")]
    ProfileNotFound,

    #[error("Amount overflow: {0}")]
    AmountOverflow(#[from] BalanceOverflow),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::TransactionNotFound(_))
    }
}
