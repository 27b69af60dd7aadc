use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Transaction, TransactionType};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Income against expenses, computed from the transaction list alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseSummary {
    pub income: Cents,
    pub expense: Cents,
    pub net: Cents,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
}

pub fn summarize(transactions: &[Transaction]) -> IncomeExpenseSummary {
    let (income, expense) = transactions
        .iter()
        .fold((0 as Cents, 0 as Cents), |(income, expense), txn| match txn.kind {
            TransactionType::Income => (income.saturating_add(txn.amount), expense),
            TransactionType::Expense => (income, expense.saturating_add(txn.amount)),
        });

    IncomeExpenseSummary {
        income,
        expense,
        net: income.saturating_sub(expense),
        transaction_count: transactions.len(),
    }
}

/// Group expenses by category name, largest first.
pub fn expense_breakdown(transactions: &[Transaction]) -> CategoryReport {
    let mut groups: HashMap<&str, (Cents, usize)> = HashMap::new();

    for txn in transactions.iter().filter(|t| !t.is_income()) {
        let name = txn
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED);
        let entry = groups.entry(name).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(txn.amount);
        entry.1 += 1;
    }

    let total = groups
        .values()
        .fold(0 as Cents, |acc, (sum, _)| acc.saturating_add(*sum));

    let mut categories: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(name, (sum, count))| CategorySummary {
            category: name.to_string(),
            total: sum,
            count,
            percentage: if total > 0 {
                (sum as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        })
        .collect();

    categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    CategoryReport { categories, total }
}
