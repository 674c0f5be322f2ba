//! Price history access port.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `ticker` ordered by date, from `start_date` onwards
    /// (full history when `None`). May be empty.
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SwingscanError>;
}
