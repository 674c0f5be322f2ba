//! Summary statistics and the daily equity series of a finished backtest.

use super::backtest::{BacktestState, Outcome, Trade};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub capital: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub expired: usize,
    /// wins / (wins + losses); expired trades are not counted.
    pub win_rate: f64,
    pub avg_profit: f64,
    pub max_drawdown: f64,
    pub best_trade: Option<Trade>,
    pub worst_trade: Option<Trade>,
}

impl Summary {
    pub fn compute(state: &BacktestState, initial_capital: f64) -> Self {
        let trades = &state.trades;
        let decided = state.win_count + state.loss_count;
        let win_rate = if decided > 0 {
            state.win_count as f64 / decided as f64
        } else {
            0.0
        };

        let avg_profit = if trades.is_empty() {
            0.0
        } else {
            trades.iter().map(|t| t.profit).sum::<f64>() / trades.len() as f64
        };

        let total_return = if initial_capital > 0.0 {
            (state.capital - initial_capital) / initial_capital
        } else {
            0.0
        };

        let best_trade = trades
            .iter()
            .max_by(|a, b| a.profit.total_cmp(&b.profit))
            .cloned();
        let worst_trade = trades
            .iter()
            .min_by(|a, b| a.profit.total_cmp(&b.profit))
            .cloned();

        Summary {
            initial_capital,
            final_capital: state.capital,
            total_return,
            total_trades: trades.len(),
            wins: state.win_count,
            losses: state.loss_count,
            expired: trades
                .iter()
                .filter(|t| t.outcome == Outcome::Expired)
                .count(),
            win_rate,
            avg_profit,
            max_drawdown: state.max_drawdown,
            best_trade,
            worst_trade,
        }
    }
}

/// Capital at the end of every calendar day between the first and last exit.
///
/// Each day adds the profits of all trades exiting on it; days without exits
/// carry the previous value forward.
pub fn equity_curve(trades: &[Trade], initial_capital: f64) -> Vec<EquityPoint> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for trade in trades {
        *daily.entry(trade.exit_date).or_insert(0.0) += trade.profit;
    }

    let (Some(&first), Some(&last)) = (daily.keys().next(), daily.keys().next_back()) else {
        return Vec::new();
    };

    let mut capital = initial_capital;
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| {
            capital += daily.get(&date).copied().unwrap_or(0.0);
            EquityPoint { date, capital }
        })
        .collect()
}
