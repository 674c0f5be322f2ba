//! Risk policy and fixed-fractional position sizing.

/// Money-management parameters shared by live scanning and the backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    /// Percentage of capital put at risk per trade.
    pub risk_pct: f64,
    pub min_investment: f64,
    pub min_net_profit: f64,
    /// Flat commission per round trip.
    pub commission: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            risk_pct: 1.0,
            min_investment: 10.0,
            min_net_profit: 2.0,
            commission: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub shares: f64,
    pub value: f64,
    pub risk_budget: f64,
}

/// Size a long position so that a stop-out loses `risk_pct` of `capital`.
///
/// Returns `None` when the stop is not below the entry. Shares may be
/// fractional.
pub fn size_position(capital: f64, entry: f64, stop_loss: f64, config: &RiskConfig) -> Option<PositionSize> {
    let risk_per_share = entry - stop_loss;
    if risk_per_share <= 0.0 {
        return None;
    }
    let risk_budget = capital * (config.risk_pct / 100.0);
    let shares = risk_budget / risk_per_share;
    Some(PositionSize {
        shares,
        value: entry * shares,
        risk_budget,
    })
}

/// (target - entry) * shares - commission
pub fn estimated_net_profit(entry: f64, take_profit: f64, shares: f64, config: &RiskConfig) -> f64 {
    (take_profit - entry) * shares - config.commission
}

/// (entry - stop) * shares + commission
pub fn estimated_loss(entry: f64, stop_loss: f64, shares: f64, config: &RiskConfig) -> f64 {
    (entry - stop_loss) * shares + config.commission
}
