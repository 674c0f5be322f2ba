//! Concrete adapter implementations for ports.

pub mod asset_csv_adapter;
pub mod csv_adapter;
pub mod earnings_csv_adapter;
pub mod file_config_adapter;
pub mod ledger_csv_adapter;
pub mod report_adapter;
pub mod webhook_adapter;
