//! Port traits for the collaborators around the signal engine.

pub mod asset_port;
pub mod config_port;
pub mod data_port;
pub mod earnings_port;
pub mod ledger_port;
pub mod notify_port;
pub mod report_port;
