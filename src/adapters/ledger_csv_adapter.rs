//! Operations ledger and capital files.
//!
//! The ledger is a CSV with `status`, `estimated_profit` and `estimated_loss`
//! columns (headers matched after normalization). The current capital is
//! written to a plain text file and appended to a `date,capital` history.

use super::asset_csv_adapter::{find_column, normalize_header};
use crate::domain::error::SwingscanError;
use crate::domain::ledger::LedgerEntry;
use crate::ports::ledger_port::LedgerPort;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

pub struct LedgerCsvAdapter {
    ledger_path: PathBuf,
    capital_path: PathBuf,
    history_path: PathBuf,
}

impl LedgerCsvAdapter {
    pub fn new(ledger_path: PathBuf, capital_path: PathBuf, history_path: PathBuf) -> Self {
        Self {
            ledger_path,
            capital_path,
            history_path,
        }
    }

    fn ledger_err(&self, e: impl std::fmt::Display) -> SwingscanError {
        SwingscanError::Ledger {
            reason: format!("{}: {}", self.ledger_path.display(), e),
        }
    }
}

fn parse_amount(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

impl LedgerPort for LedgerCsvAdapter {
    fn closed_operations(&self) -> Result<Vec<LedgerEntry>, SwingscanError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.ledger_path)
            .map_err(|e| self.ledger_err(e))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| self.ledger_err(e))?
            .iter()
            .map(normalize_header)
            .collect();
        let status_col = find_column(&headers, &self.ledger_path, "status", |h| h == "status")?;
        let profit_col = find_column(&headers, &self.ledger_path, "estimated_profit", |h| {
            h == "estimated_profit"
        })?;
        let loss_col = find_column(&headers, &self.ledger_path, "estimated_loss", |h| {
            h == "estimated_loss"
        })?;

        let mut entries = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.ledger_err(e))?;
            entries.push(LedgerEntry {
                status: record.get(status_col).unwrap_or("").to_string(),
                estimated_profit: parse_amount(record.get(profit_col)),
                estimated_loss: parse_amount(record.get(loss_col)),
            });
        }
        Ok(entries)
    }

    fn record_capital(&self, at: NaiveDateTime, capital: f64) -> Result<(), SwingscanError> {
        let rounded = format!("{:.2}", capital);
        fs::write(&self.capital_path, &rounded)?;

        let is_new = !self.history_path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        let history_err = |e: csv::Error| SwingscanError::Ledger {
            reason: format!("{}: {}", self.history_path.display(), e),
        };
        if is_new {
            wtr.write_record(["date", "capital"]).map_err(history_err)?;
        }
        wtr.write_record([at.format("%Y-%m-%d %H:%M:%S").to_string(), rounded])
            .map_err(history_err)?;
        wtr.flush()?;
        Ok(())
    }
}
