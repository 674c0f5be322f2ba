//! Walk-forward backtest simulator.
//!
//! Each day of an asset's trimmed history is evaluated with only the bars up
//! to and including that day visible. A signal is resolved against the
//! following `lookahead_bars` bars: stop first, then target, otherwise it
//! expires at the last close of the window. All assets share one
//! [`BacktestState`].

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::domain::indicator::{self, EnrichedBar};
use crate::domain::signal::{self, Signal, StrategyConfig};
use crate::domain::universe::{Asset, signal_candidates};
use crate::ports::data_port::DataPort;
use crate::ports::earnings_port::EarningsPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// First date of history to load; defaults to `history_days` before today.
    pub start_date: Option<NaiveDate>,
    pub history_days: i64,
    pub lookahead_bars: usize,
    /// Enriched bars that must precede the first evaluated day.
    pub min_enriched_bars: usize,
    /// Book stop-outs as `-(entry - stop) * shares - commission` instead of
    /// `(entry - stop) * shares - commission`.
    pub book_stops_as_losses: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 500.0,
            start_date: None,
            history_days: 730,
            lookahead_bars: 10,
            min_enriched_bars: 60,
            book_stops_as_losses: false,
        }
    }
}

impl BacktestConfig {
    /// Falls back to the earliest representable date when `history_days`
    /// reaches past it.
    pub fn history_start(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or_else(|| {
            chrono::Duration::try_days(self.history_days)
                .and_then(|span| today.checked_sub_signed(span))
                .unwrap_or(NaiveDate::MIN)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    #[serde(rename = "TP")]
    TargetHit,
    #[serde(rename = "SL")]
    StopHit,
    #[serde(rename = "EXP")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub outcome: Outcome,
    pub shares: f64,
    pub profit: f64,
    pub capital_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestState {
    pub capital: f64,
    pub peak_capital: f64,
    pub max_drawdown: f64,
    pub win_count: usize,
    pub loss_count: usize,
    pub trades: Vec<Trade>,
}

impl BacktestState {
    pub fn new(initial_capital: f64) -> Self {
        BacktestState {
            capital: initial_capital,
            peak_capital: initial_capital,
            max_drawdown: 0.0,
            win_count: 0,
            loss_count: 0,
            trades: Vec::new(),
        }
    }

    /// Apply `trade.profit` to the ledger and append the trade.
    /// `capital_after` is overwritten with the resulting capital.
    pub fn record(&mut self, mut trade: Trade) {
        self.capital += trade.profit;
        self.peak_capital = self.peak_capital.max(self.capital);
        self.max_drawdown = self.max_drawdown.max(self.peak_capital - self.capital);
        match trade.outcome {
            Outcome::TargetHit => self.win_count += 1,
            Outcome::StopHit => self.loss_count += 1,
            Outcome::Expired => {}
        }
        trade.capital_after = self.capital;
        self.trades.push(trade);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub exit_index: usize,
    pub exit_price: f64,
}

/// Resolve a long entered at `bars[entry_index]` against the following bars.
///
/// The stop is checked before the target on each bar, so a bar touching both
/// resolves as a stop-out.
pub fn resolve_trade(
    bars: &[EnrichedBar],
    entry_index: usize,
    stop_loss: f64,
    take_profit: f64,
    lookahead: usize,
) -> Resolution {
    let last = entry_index
        .saturating_add(lookahead)
        .min(bars.len().saturating_sub(1));

    for (j, eb) in bars.iter().enumerate().take(last + 1).skip(entry_index + 1) {
        if eb.bar.low <= stop_loss {
            return Resolution {
                outcome: Outcome::StopHit,
                exit_index: j,
                exit_price: stop_loss,
            };
        }
        if eb.bar.high >= take_profit {
            return Resolution {
                outcome: Outcome::TargetHit,
                exit_index: j,
                exit_price: take_profit,
            };
        }
    }

    Resolution {
        outcome: Outcome::Expired,
        exit_index: last,
        exit_price: bars[last].bar.close,
    }
}

pub fn trade_profit(
    signal: &Signal,
    resolution: &Resolution,
    commission: f64,
    book_stops_as_losses: bool,
) -> f64 {
    let shares = signal.position_size;
    let entry = signal.entry_price;
    match resolution.outcome {
        Outcome::TargetHit => (signal.take_profit - entry) * shares - commission,
        Outcome::StopHit if book_stops_as_losses => {
            -(entry - signal.stop_loss) * shares - commission
        }
        Outcome::StopHit => (entry - signal.stop_loss) * shares - commission,
        Outcome::Expired => (resolution.exit_price - entry) * shares - commission,
    }
}

/// Walk one asset's trimmed history, recording every resolved trade in
/// `state`. Returns the number of trades recorded.
pub fn run_asset(
    state: &mut BacktestState,
    ticker: &str,
    bars: &[EnrichedBar],
    strategy: &StrategyConfig,
    config: &BacktestConfig,
    earnings: &dyn EarningsPort,
) -> usize {
    let mut opened = 0;

    for i in config.min_enriched_bars..bars.len() {
        let visible = &bars[..=i];
        let Ok(signal) = signal::evaluate(visible, ticker, state.capital, strategy, earnings) else {
            continue;
        };

        let resolution = resolve_trade(
            bars,
            i,
            signal.stop_loss,
            signal.take_profit,
            config.lookahead_bars,
        );
        let profit = trade_profit(
            &signal,
            &resolution,
            strategy.risk.commission,
            config.book_stops_as_losses,
        );

        state.record(Trade {
            ticker: ticker.to_string(),
            entry_date: bars[i].bar.date,
            exit_date: bars[resolution.exit_index].bar.date,
            entry_price: signal.entry_price,
            exit_price: resolution.exit_price,
            outcome: resolution.outcome,
            shares: signal.position_size,
            profit,
            capital_after: 0.0,
        });
        opened += 1;
    }

    opened
}

/// Backtest every signal candidate in `assets` against one shared ledger.
///
/// Assets whose history cannot be fetched, or is too short to evaluate, are
/// skipped.
pub fn run_backtest(
    assets: &[Asset],
    data: &dyn DataPort,
    earnings: &dyn EarningsPort,
    strategy: &StrategyConfig,
    config: &BacktestConfig,
    today: NaiveDate,
) -> BacktestState {
    let mut state = BacktestState::new(config.initial_capital);
    let start = config.history_start(today);

    for asset in signal_candidates(assets) {
        let ticker = asset.ticker.as_str();
        info!("Backtesting {}...", ticker);

        let raw = match data.fetch_history(ticker, Some(start)) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("skipping {} ({})", ticker, e);
                continue;
            }
        };
        if raw.len() < config.min_enriched_bars {
            warn!(
                "skipping {} (only {} bars, minimum {} required)",
                ticker,
                raw.len(),
                config.min_enriched_bars
            );
            continue;
        }

        let bars = indicator::prepare(&raw);
        if bars.len() <= config.min_enriched_bars {
            warn!(
                "skipping {} ({} bars after {}-bar indicator warm-up)",
                ticker,
                bars.len(),
                indicator::warmup_len()
            );
            continue;
        }

        let trades = run_asset(&mut state, ticker, &bars, strategy, config, earnings);
        info!("  {}: {} trades, capital {:.2}", ticker, trades, state.capital);
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorSet;
    use crate::domain::ohlcv::PriceBar;
    use crate::domain::signal::{Snapshot, StopSource, TargetSource};
    use approx::assert_relative_eq;

    fn bar(day: i64, low: f64, high: f64, close: f64) -> EnrichedBar {
        EnrichedBar {
            bar: PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day),
                open: close,
                high,
                low,
                close,
                volume: 1000.0,
            },
            indicators: IndicatorSet::default(),
        }
    }

    fn signal(entry: f64, stop: f64, target: f64, shares: f64) -> Signal {
        Signal {
            ticker: "AAA".into(),
            entry_price: entry,
            stop_loss: stop,
            take_profit: target,
            position_size: shares,
            position_value: entry * shares,
            estimated_net_profit: 0.0,
            estimated_loss: 0.0,
            risk_reward_ratio: (target - entry) / (entry - stop),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            rationale: Vec::new(),
            stop_source: StopSource::Atr,
            target_source: TargetSource::RiskReward,
            snapshot: Snapshot {
                close: entry,
                volume: 0.0,
                ema20: 0.0,
                ema50: 0.0,
                ema200: 0.0,
                rsi: 0.0,
                macd: 0.0,
                macd_signal: 0.0,
                atr: 0.0,
                volume_ma20: 0.0,
            },
        }
    }

    fn trade(outcome: Outcome, profit: f64) -> Trade {
        Trade {
            ticker: "AAA".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            entry_price: 10.0,
            exit_price: 11.0,
            outcome,
            shares: 1.0,
            profit,
            capital_after: 0.0,
        }
    }

    #[test]
    fn stop_wins_same_bar_tie() {
        let bars = vec![bar(0, 99.0, 101.0, 100.0), bar(1, 90.0, 120.0, 105.0)];
        let r = resolve_trade(&bars, 0, 95.0, 110.0, 10);
        assert_eq!(r.outcome, Outcome::StopHit);
        assert_eq!(r.exit_index, 1);
        assert_eq!(r.exit_price, 95.0);
    }

    #[test]
    fn target_hit_on_later_bar() {
        let bars = vec![
            bar(0, 99.0, 101.0, 100.0),
            bar(1, 99.0, 103.0, 102.0),
            bar(2, 101.0, 111.0, 110.0),
        ];
        let r = resolve_trade(&bars, 0, 95.0, 110.0, 10);
        assert_eq!(r.outcome, Outcome::TargetHit);
        assert_eq!(r.exit_index, 2);
        assert_eq!(r.exit_price, 110.0);
    }

    #[test]
    fn expires_at_close_of_window_end() {
        let bars: Vec<EnrichedBar> = (0..15)
            .map(|d| bar(d, 99.0, 101.0, 100.0 + d as f64 * 0.1))
            .collect();
        let r = resolve_trade(&bars, 2, 95.0, 110.0, 10);
        assert_eq!(r.outcome, Outcome::Expired);
        assert_eq!(r.exit_index, 12);
        assert_relative_eq!(r.exit_price, 101.2);
    }

    #[test]
    fn expiry_is_bounded_by_series_end() {
        let bars: Vec<EnrichedBar> = (0..5).map(|d| bar(d, 99.0, 101.0, 100.0)).collect();
        let r = resolve_trade(&bars, 2, 95.0, 110.0, 10);
        assert_eq!(r.outcome, Outcome::Expired);
        assert_eq!(r.exit_index, 4);

        let on_last = resolve_trade(&bars, 4, 95.0, 110.0, 10);
        assert_eq!(on_last.exit_index, 4);
    }

    #[test]
    fn bar_beyond_lookahead_is_ignored() {
        let mut bars: Vec<EnrichedBar> = (0..14).map(|d| bar(d, 99.0, 101.0, 100.0)).collect();
        bars[11] = bar(11, 50.0, 101.0, 60.0);
        let r = resolve_trade(&bars, 0, 95.0, 110.0, 10);
        assert_eq!(r.outcome, Outcome::Expired);
        assert_eq!(r.exit_index, 10);
    }

    #[test]
    fn target_profit_example() {
        let s = signal(50.0, 48.0, 56.0, 10.0);
        let r = Resolution {
            outcome: Outcome::TargetHit,
            exit_index: 1,
            exit_price: 56.0,
        };
        assert_relative_eq!(trade_profit(&s, &r, 1.0, false), 59.0);
    }

    #[test]
    fn stop_profit_conventions() {
        let s = signal(50.0, 48.0, 56.0, 10.0);
        let r = Resolution {
            outcome: Outcome::StopHit,
            exit_index: 1,
            exit_price: 48.0,
        };
        assert_relative_eq!(trade_profit(&s, &r, 1.0, false), 19.0);
        assert_relative_eq!(trade_profit(&s, &r, 1.0, true), -21.0);
    }

    #[test]
    fn expired_profit_uses_exit_close() {
        let s = signal(50.0, 48.0, 56.0, 10.0);
        let r = Resolution {
            outcome: Outcome::Expired,
            exit_index: 10,
            exit_price: 49.5,
        };
        assert_relative_eq!(trade_profit(&s, &r, 1.0, false), -6.0);
    }

    #[test]
    fn record_updates_ledger() {
        let mut state = BacktestState::new(500.0);
        state.record(trade(Outcome::TargetHit, 20.0));
        state.record(trade(Outcome::Expired, -30.0));
        state.record(trade(Outcome::StopHit, -5.0));

        assert_relative_eq!(state.capital, 485.0);
        assert_relative_eq!(state.peak_capital, 520.0);
        assert_relative_eq!(state.max_drawdown, 35.0);
        assert_eq!(state.win_count, 1);
        assert_eq!(state.loss_count, 1);
        assert_eq!(state.trades.len(), 3);
        assert_relative_eq!(state.trades[1].capital_after, 490.0);
    }

    #[test]
    fn drawdown_never_decreases() {
        let mut state = BacktestState::new(100.0);
        let mut previous = 0.0;
        for profit in [5.0, -10.0, 20.0, -3.0, -8.0, 40.0, -1.0] {
            state.record(trade(Outcome::Expired, profit));
            assert!(state.max_drawdown >= previous);
            previous = state.max_drawdown;
        }
        assert_relative_eq!(state.max_drawdown, 11.0);
    }

    #[test]
    fn history_start_defaults_to_window() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let config = BacktestConfig::default();
        assert_eq!(
            config.history_start(today),
            today - chrono::Duration::days(730)
        );

        let fixed = BacktestConfig {
            start_date: NaiveDate::from_ymd_opt(2020, 6, 1),
            ..BacktestConfig::default()
        };
        assert_eq!(fixed.history_start(today), NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
    }

    #[test]
    fn history_start_saturates_on_huge_window() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        for days in [200_000_000, i64::MAX] {
            let config = BacktestConfig {
                history_days: days,
                ..BacktestConfig::default()
            };
            assert_eq!(config.history_start(today), NaiveDate::MIN);
        }
    }

    #[test]
    fn huge_lookahead_is_bounded_by_series() {
        let bars = vec![
            bar(0, 99.0, 101.0, 100.0),
            bar(1, 99.5, 101.5, 100.5),
            bar(2, 99.5, 101.5, 101.0),
        ];
        let r = resolve_trade(&bars, 0, 95.0, 110.0, usize::MAX);
        assert_eq!(r.outcome, Outcome::Expired);
        assert_eq!(r.exit_index, 2);
        assert_relative_eq!(r.exit_price, 101.0);
    }

    #[test]
    fn too_few_enriched_bars_yield_no_trades() {
        let bars: Vec<EnrichedBar> = (0..60).map(|d| bar(d, 99.0, 101.0, 100.0)).collect();
        let mut state = BacktestState::new(500.0);
        let n = run_asset(
            &mut state,
            "AAA",
            &bars,
            &StrategyConfig::default(),
            &BacktestConfig::default(),
            &crate::ports::earnings_port::NoEarnings,
        );
        assert_eq!(n, 0);
        assert!(state.trades.is_empty());
    }
}
