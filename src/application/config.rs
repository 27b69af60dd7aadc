use crate::domain::Balance;

/// Default number of entries returned by `recent`.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Tunables for a [`LedgerService`](super::LedgerService).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Balance written by `initialize` when none is stored
    pub seed: Balance,
    pub recent_limit: usize,
}

impl LedgerConfig {
    pub fn with_seed(mut self, seed: Balance) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            seed: Balance::DEMO_SEED,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
