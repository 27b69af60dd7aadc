mod category;
mod ledger;
mod money;
mod profile;
mod transaction;

pub use category::*;
pub use ledger::*;
pub use money::*;
pub use profile::*;
pub use transaction::*;
