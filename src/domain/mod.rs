//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod pivot;
pub mod risk;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod scanner;
pub mod ledger;
pub mod universe;
pub mod config_validation;
pub mod error;
