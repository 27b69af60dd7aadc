/// Signal sent after every successful ledger mutation. It carries no payload;
/// subscribers re-read whatever they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerChanged;

/// Buffered notifications per subscriber before it starts lagging.
pub(crate) const EVENT_CAPACITY: usize = 16;
