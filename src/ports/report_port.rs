//! Backtest report port.

use crate::domain::backtest::BacktestState;
use crate::domain::error::SwingscanError;

/// Port for writing backtest artefacts.
pub trait ReportPort {
    fn write(&self, state: &BacktestState, initial_capital: f64) -> Result<(), SwingscanError>;
}
