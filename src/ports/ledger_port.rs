//! Capital bookkeeping port.

use crate::domain::error::SwingscanError;
use crate::domain::ledger::LedgerEntry;
use chrono::NaiveDateTime;

pub trait LedgerPort {
    fn closed_operations(&self) -> Result<Vec<LedgerEntry>, SwingscanError>;

    /// Persist the current capital and append it to the capital history.
    fn record_capital(&self, at: NaiveDateTime, capital: f64) -> Result<(), SwingscanError>;
}
