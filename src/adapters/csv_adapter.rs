//! Daily price history read from one `<TICKER>.csv` file per ticker.
//!
//! Tickers are uppercase; a lowercase `<ticker>.csv` is used when the
//! uppercase file does not exist. Dates must be unique within a file.

use crate::domain::error::SwingscanError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume")]
    volume: f64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.exists() {
            return exact;
        }
        let lower = self.base_path.join(format!("{}.csv", ticker.to_lowercase()));
        if lower.exists() { lower } else { exact }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SwingscanError> {
        let path = self.csv_path(ticker);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| SwingscanError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut bars = Vec::new();
        for result in rdr.deserialize::<PriceRow>() {
            let row = result.map_err(|e| SwingscanError::Data {
                reason: format!("{}: {}", path.display(), e),
            })?;
            if start_date.is_some_and(|start| row.date < start) {
                continue;
            }
            bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SwingscanError::Data {
                reason: format!("{}: duplicate bar for {}", path.display(), pair[0].date),
            });
        }
        Ok(bars)
    }
}
