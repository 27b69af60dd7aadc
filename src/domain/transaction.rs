use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Cents};

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in (salary, refunds, gifts)
    Income,
    /// Money going out
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded income or expense event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub title: String,
    /// Magnitude in cents; the direction is carried by `kind`
    pub amount: Cents,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Effective date chosen by the user
    pub date: DateTime<Utc>,
    /// When the record was created, distinct from `date`
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction dated now with a fresh time-ordered id.
    pub fn new(title: impl Into<String>, amount: Cents, kind: TransactionType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            amount,
            kind,
            category: None,
            date: now,
            created_at: now,
        }
    }

    pub fn income(title: impl Into<String>, amount: Cents) -> Self {
        Self::new(title, amount, TransactionType::Income)
    }

    pub fn expense(title: impl Into<String>, amount: Cents) -> Self {
        Self::new(title, amount, TransactionType::Expense)
    }

    pub fn with_id(mut self, id: impl Into<TransactionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Signed effect of this transaction on the net total.
    pub fn signed_amount(&self) -> Cents {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::find_category;

    #[test]
    fn test_create_transaction() {
        let txn = Transaction::expense("Lunch", 1250)
            .with_id("t1")
            .with_category(find_category("food").unwrap());

        assert_eq!(txn.id, "t1");
        assert_eq!(txn.amount, 1250);
        assert_eq!(txn.kind, TransactionType::Expense);
        assert_eq!(txn.signed_amount(), -1250);
        assert_eq!(txn.category.as_ref().map(|c| c.name.as_str()), Some("Food"));
        assert!(!txn.is_income());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Transaction::income("Salary", 100);
        let b = Transaction::income("Salary", 100);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_field_names() {
        let txn = Transaction::income("Salary", 500000).with_id("t9");
        let value = serde_json::to_value(&txn).unwrap();

        assert_eq!(value["type"], "income");
        assert_eq!(value["amount"], 500000);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!(TransactionType::from_str("INCOME"), Some(TransactionType::Income));
        assert_eq!(TransactionType::from_str("expense"), Some(TransactionType::Expense));
        assert_eq!(TransactionType::from_str("transfer"), None);
    }
}
