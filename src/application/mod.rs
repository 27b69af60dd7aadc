// Application layer - the ledger service, the owner profile and the read
// models built on them

mod config;
pub mod error;
mod events;
mod profile;
pub mod reporting;
mod service;

pub use config::*;
pub use error::*;
pub use events::LedgerChanged;
pub use profile::*;
pub use reporting::{CategoryReport, CategorySummary, IncomeExpenseSummary};
pub use service::*;
