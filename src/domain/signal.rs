//! Long-setup evaluation: trend rule, stop/target placement, risk gates and
//! position sizing.
//!
//! [`evaluate`] looks only at the slice it is given; its last element is the
//! evaluation bar. Every failed gate is reported as a [`Rejection`], never as
//! an error.

use chrono::NaiveDate;
use log::{debug, info};

use crate::domain::indicator::{EnrichedBar, IndicatorSet};
use crate::domain::pivot::{PivotConfig, PivotKind, find_last_pivot};
use crate::domain::risk::{self, RiskConfig};
use crate::ports::earnings_port::EarningsPort;

/// Closes preceding the latest bar used for the breakout annotation.
const BREAKOUT_LOOKBACK: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub rsi_lower: f64,
    pub rsi_upper: f64,
    /// RSI level above which the rationale reports a strong RSI.
    pub rsi_strong: f64,
    pub min_risk_reward: f64,
    /// Reward multiple used when no resistance pivot qualifies.
    pub target_rr: f64,
    /// Pivot prices are multiplied by this before use as stop or target.
    pub pivot_buffer: f64,
    pub earnings_window_days: i64,
    pub risk: RiskConfig,
    pub pivot: PivotConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            rsi_lower: 40.0,
            rsi_upper: 70.0,
            rsi_strong: 60.0,
            min_risk_reward: 1.5,
            target_rr: 1.5,
            pivot_buffer: 0.995,
            earnings_window_days: 7,
            risk: RiskConfig::default(),
            pivot: PivotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSource {
    Pivot,
    Atr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Pivot,
    RiskReward,
}

/// Indicator values of the evaluation bar, all defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub close: f64,
    pub volume: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub atr: f64,
    pub volume_ma20: f64,
}

impl Snapshot {
    fn from_bar(bar: &EnrichedBar) -> Option<Self> {
        let IndicatorSet {
            ema20,
            ema50,
            ema200,
            rsi14,
            macd,
            macd_signal,
            atr14,
            volume_ma20,
        } = bar.indicators;
        Some(Snapshot {
            close: bar.bar.close,
            volume: bar.bar.volume,
            ema20: ema20?,
            ema50: ema50?,
            ema200: ema200?,
            rsi: rsi14?,
            macd: macd?,
            macd_signal: macd_signal?,
            atr: atr14?,
            volume_ma20: volume_ma20?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub ticker: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Shares; may be fractional.
    pub position_size: f64,
    pub position_value: f64,
    pub estimated_net_profit: f64,
    pub estimated_loss: f64,
    pub risk_reward_ratio: f64,
    pub timestamp: NaiveDate,
    pub rationale: Vec<String>,
    pub stop_source: StopSource,
    pub target_source: TargetSource,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("no bars to evaluate")]
    NoData,

    #[error("indicators undefined on {date}")]
    IndicatorsUndefined { date: NaiveDate },

    #[error("conditions not met: {}", .failed.join(", "))]
    Conditions { failed: Vec<&'static str> },

    #[error("stop {stop:.2} not below entry {entry:.2}")]
    StopNotBelowEntry { stop: f64, entry: f64 },

    #[error("target {target:.2} not above entry {entry:.2}")]
    TargetNotAboveEntry { target: f64, entry: f64 },

    #[error("risk/reward {ratio:.2} below {minimum:.2}")]
    RiskRewardTooLow { ratio: f64, minimum: f64 },

    #[error("volume {volume:.0} below 20-day average {average:.0}")]
    LowVolume { volume: f64, average: f64 },

    #[error("risk per share is not positive")]
    NonPositiveRisk,

    #[error("earnings within {days} days")]
    NearEarnings { days: i64 },

    #[error("position {position_value:.2} or net profit {net_profit:.2} below minimums")]
    BelowMinimums { position_value: f64, net_profit: f64 },
}

/// Evaluate the last bar of `bars` for a long entry sized against `capital`.
pub fn evaluate(
    bars: &[EnrichedBar],
    ticker: &str,
    capital: f64,
    config: &StrategyConfig,
    earnings: &dyn EarningsPort,
) -> Result<Signal, Rejection> {
    let result = check(bars, ticker, capital, config, earnings);
    match &result {
        Ok(signal) => info!(
            "[{}] signal on {}: entry {:.2}, stop {:.2}, target {:.2}, rr {:.2}",
            ticker,
            signal.timestamp,
            signal.entry_price,
            signal.stop_loss,
            signal.take_profit,
            signal.risk_reward_ratio
        ),
        Err(reason) => debug!("[{}] no signal: {}", ticker, reason),
    }
    result
}

/// True when the latest bar's EMA50 is above its EMA200.
pub fn is_uptrend(bars: &[EnrichedBar]) -> bool {
    bars.last()
        .and_then(|b| Some(b.indicators.ema50? > b.indicators.ema200?))
        .unwrap_or(false)
}

fn check(
    bars: &[EnrichedBar],
    ticker: &str,
    capital: f64,
    config: &StrategyConfig,
    earnings: &dyn EarningsPort,
) -> Result<Signal, Rejection> {
    let latest = bars.last().ok_or(Rejection::NoData)?;
    let s = Snapshot::from_bar(latest).ok_or(Rejection::IndicatorsUndefined {
        date: latest.bar.date,
    })?;

    let mut failed = Vec::new();
    if s.ema50 <= s.ema200 {
        failed.push("uptrend");
    }
    if s.ema20 <= s.ema50 {
        failed.push("momentum");
    }
    if !(s.close > s.ema20 && s.close > s.ema50 && s.close > s.ema200) {
        failed.push("price above EMAs");
    }
    if !(s.rsi > config.rsi_lower && s.rsi < config.rsi_upper) {
        failed.push("rsi in range");
    }
    if s.macd <= s.macd_signal {
        failed.push("macd above signal");
    }
    if !failed.is_empty() {
        return Err(Rejection::Conditions { failed });
    }

    let mut rationale = trend_rationale(bars, &s, config);
    let entry = s.close;

    let support = find_last_pivot(bars, PivotKind::Support, &config.pivot)
        .filter(|p| p.volume >= s.volume_ma20);
    let (stop_loss, stop_source) = match support {
        Some(pivot) => {
            rationale.push("SL at pivot support with high volume".to_string());
            (pivot.price * config.pivot_buffer, StopSource::Pivot)
        }
        None => {
            rationale.push("SL from ATR".to_string());
            (entry - s.atr, StopSource::Atr)
        }
    };

    let resistance = find_last_pivot(bars, PivotKind::Resistance, &config.pivot)
        .filter(|p| p.volume >= s.volume_ma20);
    let (take_profit, target_source) = match resistance {
        Some(pivot) => {
            rationale.push("TP at pivot resistance with high volume".to_string());
            (pivot.price * config.pivot_buffer, TargetSource::Pivot)
        }
        None => {
            rationale.push("TP from risk/reward multiple".to_string());
            (
                entry + (entry - stop_loss) * config.target_rr,
                TargetSource::RiskReward,
            )
        }
    };

    if stop_loss >= entry {
        return Err(Rejection::StopNotBelowEntry {
            stop: stop_loss,
            entry,
        });
    }
    if take_profit <= entry {
        return Err(Rejection::TargetNotAboveEntry {
            target: take_profit,
            entry,
        });
    }

    let risk_reward_ratio = (take_profit - entry) / (entry - stop_loss);
    if risk_reward_ratio < config.min_risk_reward {
        return Err(Rejection::RiskRewardTooLow {
            ratio: risk_reward_ratio,
            minimum: config.min_risk_reward,
        });
    }

    if s.volume < s.volume_ma20 {
        return Err(Rejection::LowVolume {
            volume: s.volume,
            average: s.volume_ma20,
        });
    }

    let size = risk::size_position(capital, entry, stop_loss, &config.risk)
        .ok_or(Rejection::NonPositiveRisk)?;
    let estimated_net_profit =
        risk::estimated_net_profit(entry, take_profit, size.shares, &config.risk);
    let estimated_loss = risk::estimated_loss(entry, stop_loss, size.shares, &config.risk);

    if earnings.is_near_earnings(ticker, latest.bar.date, config.earnings_window_days) {
        return Err(Rejection::NearEarnings {
            days: config.earnings_window_days,
        });
    }

    if size.value < config.risk.min_investment || estimated_net_profit < config.risk.min_net_profit
    {
        return Err(Rejection::BelowMinimums {
            position_value: size.value,
            net_profit: estimated_net_profit,
        });
    }

    Ok(Signal {
        ticker: ticker.to_string(),
        entry_price: entry,
        stop_loss,
        take_profit,
        position_size: size.shares,
        position_value: size.value,
        estimated_net_profit,
        estimated_loss,
        risk_reward_ratio,
        timestamp: latest.bar.date,
        rationale,
        stop_source,
        target_source,
        snapshot: s,
    })
}

fn trend_rationale(bars: &[EnrichedBar], s: &Snapshot, config: &StrategyConfig) -> Vec<String> {
    let mut notes = vec![
        "Uptrend (EMA50 > EMA200)".to_string(),
        "Positive momentum (EMA20 > EMA50)".to_string(),
        "Price above all EMAs".to_string(),
    ];
    if s.rsi > config.rsi_strong {
        notes.push(format!("Strong RSI ({:.1})", s.rsi));
    }
    notes.push("MACD bullish".to_string());

    if bars.len() > BREAKOUT_LOOKBACK {
        let prior = &bars[bars.len() - 1 - BREAKOUT_LOOKBACK..bars.len() - 1];
        let recent_high = prior
            .iter()
            .map(|b| b.bar.close)
            .fold(f64::NEG_INFINITY, f64::max);
        if s.close > recent_high {
            notes.push("Breakout of recent highs".to_string());
        }
    }

    let atrs: Vec<f64> = bars.iter().filter_map(|b| b.indicators.atr14).collect();
    if !atrs.is_empty() {
        let mean = atrs.iter().sum::<f64>() / atrs.len() as f64;
        if s.atr > mean {
            notes.push("ATR above average (high volatility)".to_string());
        }
    }

    notes
}
