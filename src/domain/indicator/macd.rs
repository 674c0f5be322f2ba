//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with the SMA of the first
//! `signal` defined MACD values.
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Line defined from index slow-1, signal from slow-1 + signal-1.

use crate::domain::indicator::ema::{calculate_ema, ema_of};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(bars, fast);
    let ema_slow = calculate_ema(bars, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let mut signal = vec![None; bars.len()];
    if let Some(first) = line.iter().position(Option::is_some) {
        let defined: Vec<f64> = line[first..].iter().map(|v| v.unwrap_or(0.0)).collect();
        for (offset, value) in ema_of(&defined, signal_period).into_iter().enumerate() {
            signal[first + offset] = value;
        }
    }

    MacdSeries { line, signal }
}

pub fn calculate_macd_default(bars: &[PriceBar]) -> MacdSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
