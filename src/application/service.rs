use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::{
    Balance, IntegrityReport, Transaction, TransactionId, build_integrity_report, compute_balance,
};
use crate::storage::{KeyValueStore, MemoryBackend, SqliteBackend, StorageBackend, WriteBatch};

use super::events::EVENT_CAPACITY;
use super::reporting::{self, CategoryReport, IncomeExpenseSummary};
use super::{AppError, LedgerChanged, LedgerConfig, ProfileStore};

/// Store key holding the JSON array of transactions.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// Store key holding the cached balance.
pub const BALANCE_KEY: &str = "balance";

/// Both ledger records, as exported and restored together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
}

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, TUI, tests, etc.).
///
/// Each mutation reads both records, derives the new list and balance, commits
/// them in one atomic write, and then notifies subscribers once.
pub struct LedgerService<B> {
    store: KeyValueStore<B>,
    config: LedgerConfig,
    events: broadcast::Sender<LedgerChanged>,
}

impl LedgerService<SqliteBackend> {
    /// Open (or create) the ledger database at the given path.
    pub async fn open(database_path: &str, config: LedgerConfig) -> Result<Self, AppError> {
        let backend = SqliteBackend::open(database_path).await?;
        Ok(Self::new(KeyValueStore::new(backend), config))
    }
}

impl LedgerService<MemoryBackend> {
    /// A ledger that lives only as long as the returned service.
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(KeyValueStore::new(MemoryBackend::new()), config)
    }
}

impl<B: StorageBackend> LedgerService<B> {
    pub fn new(store: KeyValueStore<B>, config: LedgerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            config,
            events,
        }
    }

    pub fn store(&self) -> &KeyValueStore<B> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The owner profile stored alongside the ledger.
    pub fn profiles(&self) -> ProfileStore<'_, B> {
        ProfileStore::new(&self.store)
    }

    // ========================
    // Notifications
    // ========================

    /// Register for change notifications. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerChanged> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn notify(&self) {
        // No subscribers is fine; nothing is queued for later ones
        let delivered = self.events.send(LedgerChanged).unwrap_or(0);
        debug!(subscribers = delivered, "Ledger changed");
    }

    // ========================
    // Lifecycle
    // ========================

    /// Write the seed balance if no balance is stored yet.
    pub async fn initialize(&self) -> Result<(), AppError> {
        if self.store.get::<Balance>(BALANCE_KEY).await?.is_none() {
            self.store.set(BALANCE_KEY, self.config.seed).await?;
            info!(seed = ?self.config.seed, "Initialized balance");
        }
        Ok(())
    }

    /// Delete the transaction list and put the seed balance back, in one
    /// atomic write.
    pub async fn reset(&self) -> Result<(), AppError> {
        let batch = WriteBatch::new()
            .remove(TRANSACTIONS_KEY)
            .put(BALANCE_KEY, &self.config.seed)?;
        self.store.commit(batch).await?;
        info!("Ledger reset");
        self.notify();
        Ok(())
    }

    // ========================
    // Mutations
    // ========================

    /// Record a new transaction at the head of the list.
    pub async fn add(&self, transaction: Transaction) -> Result<Transaction, AppError> {
        validate_amount(&transaction)?;

        let mut state = self.load_state().await?;
        if state.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(AppError::DuplicateTransaction(transaction.id));
        }

        state.balance = state.balance.with_added(&transaction)?;
        state.transactions.insert(0, transaction.clone());
        self.save_state(&state).await?;

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            "Added transaction"
        );
        self.notify();
        Ok(transaction)
    }

    /// Remove a transaction and reverse its effect on the balance.
    /// Returns the removed record.
    pub async fn delete(&self, id: &str) -> Result<Transaction, AppError> {
        let mut state = self.load_state().await?;
        let position = find_position(&state.transactions, id)?;

        let removed = state.transactions.remove(position);
        state.balance = state.balance.with_removed(&removed)?;
        self.save_state(&state).await?;

        info!(id, "Deleted transaction");
        self.notify();
        Ok(removed)
    }

    /// Replace the stored transaction with the same id, keeping its position.
    /// Returns the previous record.
    pub async fn update(&self, transaction: Transaction) -> Result<Transaction, AppError> {
        validate_amount(&transaction)?;

        let mut state = self.load_state().await?;
        let position = find_position(&state.transactions, &transaction.id)?;

        let previous = std::mem::replace(&mut state.transactions[position], transaction);
        state.balance = state
            .balance
            .with_replaced(&previous, &state.transactions[position])?;
        self.save_state(&state).await?;

        info!(id = %previous.id, "Updated transaction");
        self.notify();
        Ok(previous)
    }

    /// Recompute the cached balance from the seed and the transaction list.
    pub async fn rebuild_balance(&self) -> Result<Balance, AppError> {
        let transactions = self.load_transactions().await?;
        let balance = compute_balance(self.config.seed, &transactions)?;

        self.store.set(BALANCE_KEY, balance).await?;
        warn!(?balance, "Balance rebuilt from transaction list");
        self.notify();
        Ok(balance)
    }

    /// Replace both records with `state` in a single write.
    pub async fn restore(&self, state: LedgerState) -> Result<(), AppError> {
        for txn in &state.transactions {
            validate_amount(txn)?;
        }
        compute_balance(self.config.seed, &state.transactions)?;
        self.save_state(&state).await?;

        info!(
            transactions = state.transactions.len(),
            "Restored ledger state"
        );
        self.notify();
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    /// All transactions in stored order, newest first. Storage failures
    /// degrade to an empty list.
    pub async fn list(&self) -> Vec<Transaction> {
        match self.load_transactions().await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(error = %e, "Error getting transactions");
                Vec::new()
            }
        }
    }

    /// The first `limit` transactions of [`list`](Self::list).
    pub async fn recent(&self, limit: usize) -> Vec<Transaction> {
        let mut transactions = self.list().await;
        transactions.truncate(limit);
        transactions
    }

    /// [`recent`](Self::recent) with the configured default limit.
    pub async fn recent_default(&self) -> Vec<Transaction> {
        self.recent(self.config.recent_limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Transaction, AppError> {
        self.load_transactions()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }

    /// The cached balance. Falls back to the seed when absent or unreadable.
    pub async fn balance(&self) -> Balance {
        match self.load_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(error = %e, "Error getting balance");
                self.config.seed
            }
        }
    }

    /// Both records as currently stored.
    pub async fn snapshot(&self) -> Result<LedgerState, AppError> {
        self.load_state().await
    }

    /// Compare the cached balance with the transaction list. Read-only.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let state = self.load_state().await?;
        Ok(build_integrity_report(
            self.config.seed,
            state.balance,
            &state.transactions,
        )?)
    }

    pub async fn income_expense_summary(&self) -> IncomeExpenseSummary {
        reporting::summarize(&self.list().await)
    }

    pub async fn category_breakdown(&self) -> CategoryReport {
        reporting::expense_breakdown(&self.list().await)
    }

    // ========================
    // Persistence helpers
    // ========================

    async fn load_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .store
            .get::<Vec<Transaction>>(TRANSACTIONS_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn load_balance(&self) -> Result<Balance, AppError> {
        Ok(self
            .store
            .get::<Balance>(BALANCE_KEY)
            .await?
            .unwrap_or(self.config.seed))
    }

    async fn load_state(&self) -> Result<LedgerState, AppError> {
        Ok(LedgerState {
            transactions: self.load_transactions().await?,
            balance: self.load_balance().await?,
        })
    }

    async fn save_state(&self, state: &LedgerState) -> Result<(), AppError> {
        let batch = WriteBatch::new()
            .put(TRANSACTIONS_KEY, &state.transactions)?
            .put(BALANCE_KEY, &state.balance)?;
        self.store.commit(batch).await?;
        Ok(())
    }
}

fn validate_amount(transaction: &Transaction) -> Result<(), AppError> {
    if transaction.amount < 0 {
        return Err(AppError::InvalidAmount {
            id: transaction.id.clone(),
            amount: transaction.amount,
        });
    }
    Ok(())
}

fn find_position(transactions: &[Transaction], id: &str) -> Result<usize, AppError> {
    transactions
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| AppError::TransactionNotFound(TransactionId::from(id)))
}
