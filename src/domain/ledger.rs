use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionId, TransactionType};

/// Cached aggregate of the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub income: Cents,
    pub expense: Cents,
    pub total: Cents,
}

impl Balance {
    /// Demo balance written when a ledger is first opened: 10840.00 in,
    /// 1884.00 out, 2548.00 net. The net figure is kept as-is even though it
    /// is not `income - expense`; every later mutation moves it by deltas.
    pub const DEMO_SEED: Balance = Balance {
        income: 1_084_000,
        expense: 188_400,
        total: 254_800,
    };

    pub const fn zero() -> Self {
        Self {
            income: 0,
            expense: 0,
            total: 0,
        }
    }

    /// Difference between the stored net total and `income - expense`.
    /// Mutations never change this value.
    pub fn drift(&self) -> Cents {
        self.total - (self.income - self.expense)
    }

    /// Balance after recording `txn`.
    pub fn with_added(self, txn: &Transaction) -> Result<Self, BalanceOverflow> {
        match txn.kind {
            TransactionType::Income => Ok(Self {
                income: checked(self.income.checked_add(txn.amount))?,
                total: checked(self.total.checked_add(txn.amount))?,
                ..self
            }),
            TransactionType::Expense => Ok(Self {
                expense: checked(self.expense.checked_add(txn.amount))?,
                total: checked(self.total.checked_sub(txn.amount))?,
                ..self
            }),
        }
    }

    /// Balance after removing `txn`; the exact inverse of [`Balance::with_added`].
    pub fn with_removed(self, txn: &Transaction) -> Result<Self, BalanceOverflow> {
        match txn.kind {
            TransactionType::Income => Ok(Self {
                income: checked(self.income.checked_sub(txn.amount))?,
                total: checked(self.total.checked_sub(txn.amount))?,
                ..self
            }),
            TransactionType::Expense => Ok(Self {
                expense: checked(self.expense.checked_sub(txn.amount))?,
                total: checked(self.total.checked_add(txn.amount))?,
                ..self
            }),
        }
    }

    /// Balance after replacing `old` with `new`. Handles a change of type by
    /// moving the amount between buckets.
    pub fn with_replaced(
        self,
        old: &Transaction,
        new: &Transaction,
    ) -> Result<Self, BalanceOverflow> {
        self.with_removed(old)?.with_added(new)
    }
}

/// A balance bucket left the range of [`Cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceOverflow;

impl fmt::Display for BalanceOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "balance is out of the representable range")
    }
}

impl std::error::Error for BalanceOverflow {}

fn checked(value: Option<Cents>) -> Result<Cents, BalanceOverflow> {
    value.ok_or(BalanceOverflow)
}

/// Sum a transaction list on top of `seed`.
pub fn compute_balance(
    seed: Balance,
    transactions: &[Transaction],
) -> Result<Balance, BalanceOverflow> {
    transactions
        .iter()
        .try_fold(seed, |balance, txn| balance.with_added(txn))
}

/// Result of comparing the cached balance with the transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub cached: Balance,
    pub expected: Balance,
    pub duplicate_ids: Vec<TransactionId>,
    pub negative_amounts: Vec<TransactionId>,
}

impl IntegrityReport {
    pub fn balance_matches(&self) -> bool {
        self.cached == self.expected
    }

    pub fn is_healthy(&self) -> bool {
        self.balance_matches() && self.duplicate_ids.is_empty() && self.negative_amounts.is_empty()
    }
}

/// Build an integrity report for a ledger whose balance started at `seed`.
pub fn build_integrity_report(
    seed: Balance,
    cached: Balance,
    transactions: &[Transaction],
) -> Result<IntegrityReport, BalanceOverflow> {
    let mut seen = HashSet::new();
    let mut duplicate_ids = Vec::new();
    for txn in transactions {
        if !seen.insert(txn.id.as_str()) && !duplicate_ids.contains(&txn.id) {
            duplicate_ids.push(txn.id.clone());
        }
    }

    let negative_amounts = transactions
        .iter()
        .filter(|t| t.amount < 0)
        .map(|t| t.id.clone())
        .collect();

    let income_count = transactions.iter().filter(|t| t.is_income()).count();

    Ok(IntegrityReport {
        transaction_count: transactions.len(),
        income_count,
        expense_count: transactions.len() - income_count,
        cached,
        expected: compute_balance(seed, transactions)?,
        duplicate_ids,
        negative_amounts,
    })
}
