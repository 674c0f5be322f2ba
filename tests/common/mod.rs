#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use swingscan::domain::error::SwingscanError;
pub use swingscan::domain::ohlcv::PriceBar;
use swingscan::domain::signal::Signal;
use swingscan::ports::data_port::DataPort;
use swingscan::ports::earnings_port::EarningsPort;
use swingscan::ports::notify_port::NotifyPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SwingscanError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SwingscanError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(ticker).ok_or_else(|| SwingscanError::NoData {
            ticker: ticker.to_string(),
        })?;
        Ok(bars
            .iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .cloned()
            .collect())
    }
}

/// Earnings oracle that flags a fixed set of tickers on every date.
#[derive(Default)]
pub struct MockEarnings {
    pub near: HashSet<String>,
}

impl MockEarnings {
    pub fn near(tickers: &[&str]) -> Self {
        Self {
            near: tickers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl EarningsPort for MockEarnings {
    fn is_near_earnings(&self, ticker: &str, _as_of: NaiveDate, _window_days: i64) -> bool {
        self.near.contains(ticker)
    }
}

/// Notifier that records every signal it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Signal>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, signal: &Signal) -> Result<u16, SwingscanError> {
        if self.fail {
            return Err(SwingscanError::Notify {
                reason: "connection refused".into(),
            });
        }
        self.sent.borrow_mut().push(signal.clone());
        Ok(200)
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

pub fn make_bar(i: usize, close: f64, volume: f64) -> PriceBar {
    PriceBar {
        date: start_date() + chrono::Duration::days(i as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume,
    }
}

/// Three-bar cycle: base, base + 1, base + 2, with the base rising 0.8 per
/// cycle. Up days trade 1.5M shares, pullback days 1.0M.
///
/// Once indicators are defined most peak bars qualify for a long entry with
/// an ATR stop, and the next pullback hits that stop. Peaks whose 1.5R
/// target rounds to a ratio just under 1.5 are rejected.
pub fn zigzag_close(i: usize) -> f64 {
    let (k, r) = (i / 3, i % 3);
    100.0 + 0.8 * k as f64 + r as f64
}

pub fn zigzag_series(n: usize) -> Vec<PriceBar> {
    let mut bars: Vec<PriceBar> = (0..n)
        .map(|i| {
            let volume = if i % 3 == 0 { 1_000_000.0 } else { 1_500_000.0 };
            make_bar(i, zigzag_close(i), volume)
        })
        .collect();
    for i in 1..bars.len() {
        bars[i].open = bars[i - 1].close;
    }
    bars
}

/// `zigzag_series(300)` (whose last bar is a signal) followed by `extra`
/// flat bars at `offset` above the final close.
pub fn zigzag_then_flat(offset: f64, extra: usize) -> Vec<PriceBar> {
    let mut bars = zigzag_series(300);
    let level = zigzag_close(299) + offset;
    for i in 300..300 + extra {
        let mut bar = make_bar(i, level, 1_000_000.0);
        bar.open = bars[i - 1].close;
        bars.push(bar);
    }
    bars
}

pub fn linear_series(n: usize, start: f64, slope: f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| make_bar(i, start + slope * i as f64, 1_000_000.0))
        .collect()
}

pub fn constant_series(n: usize, close: f64) -> Vec<PriceBar> {
    (0..n).map(|i| make_bar(i, close, 1_000_000.0)).collect()
}
