//! Configuration validation.
//!
//! Validates every config field before a run. Missing optional keys are
//! checked against their defaults.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::SwingscanError;
use crate::domain::pivot::PivotConfig;
use crate::domain::signal::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// One century of daily history.
pub const MAX_HISTORY_DAYS: i64 = 36_500;
pub const MAX_LOOKAHEAD_BARS: i64 = 1_000;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_pivot_config(config)?;
    validate_backtest_config(config)?;
    validate_ledger_config(config)?;
    validate_webhook_config(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SwingscanError {
    SwingscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, SwingscanError> {
    config
        .get_non_blank(section, key)
        .ok_or_else(|| SwingscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    require_string(config, "data", "prices_dir")?;
    require_string(config, "data", "assets_file")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    let d = StrategyConfig::default();

    let risk_pct = config.get_double("strategy", "risk_pct", d.risk.risk_pct);
    if risk_pct <= 0.0 || risk_pct > 100.0 {
        return Err(invalid("strategy", "risk_pct", "risk_pct must be in (0, 100]"));
    }
    for (key, default) in [
        ("min_investment", d.risk.min_investment),
        ("min_net_profit", d.risk.min_net_profit),
        ("commission", d.risk.commission),
    ] {
        if config.get_double("strategy", key, default) < 0.0 {
            return Err(invalid("strategy", key, &format!("{} must be non-negative", key)));
        }
    }
    for (key, default) in [
        ("min_risk_reward", d.min_risk_reward),
        ("target_rr", d.target_rr),
    ] {
        if config.get_double("strategy", key, default) <= 0.0 {
            return Err(invalid("strategy", key, &format!("{} must be positive", key)));
        }
    }

    let buffer = config.get_double("strategy", "pivot_buffer", d.pivot_buffer);
    if buffer <= 0.0 || buffer > 1.0 {
        return Err(invalid("strategy", "pivot_buffer", "pivot_buffer must be in (0, 1]"));
    }

    let lower = config.get_double("strategy", "rsi_lower", d.rsi_lower);
    let upper = config.get_double("strategy", "rsi_upper", d.rsi_upper);
    if !(0.0..=100.0).contains(&lower) || !(0.0..=100.0).contains(&upper) || lower >= upper {
        return Err(invalid(
            "strategy",
            "rsi_lower",
            "rsi bounds must satisfy 0 <= rsi_lower < rsi_upper <= 100",
        ));
    }

    let strong = config.get_double("strategy", "rsi_strong", d.rsi_strong);
    if !(0.0..=100.0).contains(&strong) {
        return Err(invalid("strategy", "rsi_strong", "rsi_strong must be in [0, 100]"));
    }

    if config.get_int("strategy", "earnings_window_days", d.earnings_window_days) < 0 {
        return Err(invalid(
            "strategy",
            "earnings_window_days",
            "earnings_window_days must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_pivot_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    let d = PivotConfig::default();
    let lookback = config.get_int("pivot", "lookback", d.lookback as i64);
    let left = config.get_int("pivot", "left", d.left as i64);
    let right = config.get_int("pivot", "right", d.right as i64);

    if left < 1 {
        return Err(invalid("pivot", "left", "left must be at least 1"));
    }
    if right < 1 {
        return Err(invalid("pivot", "right", "right must be at least 1"));
    }
    if lookback <= left.saturating_add(right) {
        return Err(invalid("pivot", "lookback", "lookback must exceed left + right"));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    let d = BacktestConfig::default();

    if config.get_double("backtest", "initial_capital", d.initial_capital) <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    if let Some(s) = config.get_non_blank("backtest", "start_date") {
        parse_date(&s, "backtest", "start_date")?;
    }
    let history_days = config.get_int("backtest", "history_days", d.history_days);
    if !(1..=MAX_HISTORY_DAYS).contains(&history_days) {
        return Err(invalid(
            "backtest",
            "history_days",
            &format!("history_days must be in [1, {}]", MAX_HISTORY_DAYS),
        ));
    }
    let lookahead = config.get_int("backtest", "lookahead_bars", d.lookahead_bars as i64);
    if !(1..=MAX_LOOKAHEAD_BARS).contains(&lookahead) {
        return Err(invalid(
            "backtest",
            "lookahead_bars",
            &format!("lookahead_bars must be in [1, {}]", MAX_LOOKAHEAD_BARS),
        ));
    }
    if config.get_int("backtest", "min_enriched_bars", d.min_enriched_bars as i64) < 1 {
        return Err(invalid(
            "backtest",
            "min_enriched_bars",
            "min_enriched_bars must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_ledger_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    if config.get_double("ledger", "base_capital", 0.0) < 0.0 {
        return Err(invalid("ledger", "base_capital", "base_capital must be non-negative"));
    }
    Ok(())
}

pub fn validate_webhook_config(config: &dyn ConfigPort) -> Result<(), SwingscanError> {
    if config.get_int("webhook", "timeout_secs", 10) < 1 {
        return Err(invalid("webhook", "timeout_secs", "timeout_secs must be at least 1"));
    }
    Ok(())
}

pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, SwingscanError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            section,
            key,
            &format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}
