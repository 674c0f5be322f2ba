//! Earnings calendar loaded from a `ticker,date` CSV.

use crate::domain::error::SwingscanError;
use crate::ports::earnings_port::EarningsPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct EarningsCsvAdapter {
    dates: HashMap<String, Vec<NaiveDate>>,
}

#[derive(Debug, Deserialize)]
struct EarningsRow {
    ticker: String,
    date: NaiveDate,
}

impl EarningsCsvAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SwingscanError> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path).map_err(|e| SwingscanError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut dates: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        for result in rdr.deserialize::<EarningsRow>() {
            let row = result.map_err(|e| SwingscanError::Data {
                reason: format!("{}: {}", path.display(), e),
            })?;
            dates
                .entry(row.ticker.trim().to_uppercase())
                .or_default()
                .push(row.date);
        }

        Ok(Self { dates })
    }
}

impl EarningsPort for EarningsCsvAdapter {
    fn is_near_earnings(&self, ticker: &str, as_of: NaiveDate, window_days: i64) -> bool {
        self.dates
            .get(&ticker.to_uppercase())
            .is_some_and(|dates| {
                dates.iter().any(|d| {
                    let days = (*d - as_of).num_days();
                    (0..=window_days).contains(&days)
                })
            })
    }
}
