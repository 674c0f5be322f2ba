//! Earnings calendar port.

use chrono::NaiveDate;

pub trait EarningsPort {
    /// True when `ticker` reports earnings within the next `window_days`
    /// days counted from `as_of` (inclusive of `as_of` itself).
    fn is_near_earnings(&self, ticker: &str, as_of: NaiveDate, window_days: i64) -> bool;
}

/// Oracle for runs without an earnings calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEarnings;

impl EarningsPort for NoEarnings {
    fn is_near_earnings(&self, _ticker: &str, _as_of: NaiveDate, _window_days: i64) -> bool {
        false
    }
}
