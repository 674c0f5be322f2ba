//! Live scan: evaluate the latest bar of every candidate asset and notify the
//! signals whose sector ETF is trending up.

use log::{info, warn};

use crate::domain::indicator;
use crate::domain::signal::{self, StrategyConfig};
use crate::domain::universe::Asset;
use crate::ports::data_port::DataPort;
use crate::ports::earnings_port::EarningsPort;
use crate::ports::notify_port::NotifyPort;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Assets whose latest bar reached the evaluator.
    pub evaluated: usize,
    /// Ineligible assets and assets without usable history.
    pub skipped: usize,
    pub signals: usize,
    pub sent: usize,
    pub blocked_by_sector: usize,
    pub failed_deliveries: usize,
    /// Tickers of delivered signals, in scan order.
    pub delivered: Vec<String>,
}

pub fn scan(
    assets: &[Asset],
    data: &dyn DataPort,
    earnings: &dyn EarningsPort,
    notifier: &dyn NotifyPort,
    strategy: &StrategyConfig,
    capital: f64,
) -> ScanReport {
    let mut report = ScanReport::default();

    for asset in assets {
        let Some(etf) = asset.sector_etf.as_deref().filter(|_| asset.is_signal_candidate()) else {
            report.skipped += 1;
            continue;
        };
        let ticker = asset.ticker.as_str();

        let raw = match data.fetch_history(ticker, None) {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                warn!("[{}] no price data", ticker);
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("[{}] {}", ticker, e);
                report.skipped += 1;
                continue;
            }
        };
        let bars = indicator::prepare(&raw);
        if bars.is_empty() {
            warn!("[{}] not enough history for indicators", ticker);
            report.skipped += 1;
            continue;
        }

        report.evaluated += 1;
        let Ok(signal) = signal::evaluate(&bars, ticker, capital, strategy, earnings) else {
            continue;
        };
        report.signals += 1;

        let sector_bars = match data.fetch_history(etf, None) {
            Ok(raw) => indicator::prepare(&raw),
            Err(e) => {
                warn!("[{}] sector ETF {} unavailable: {}", ticker, etf, e);
                Vec::new()
            }
        };
        if sector_bars.is_empty() {
            warn!("[{}] skipping signal, no usable data for sector ETF {}", ticker, etf);
            continue;
        }
        if !signal::is_uptrend(&sector_bars) {
            info!("[{}] sector {} not in uptrend, signal not sent", ticker, etf);
            report.blocked_by_sector += 1;
            continue;
        }

        match notifier.send(&signal) {
            Ok(status) => {
                info!("[{}] signal sent (status {})", ticker, status);
                report.sent += 1;
                report.delivered.push(signal.ticker.clone());
            }
            Err(e) => {
                warn!("[{}] delivery failed: {}", ticker, e);
                report.failed_deliveries += 1;
            }
        }
    }

    report
}
