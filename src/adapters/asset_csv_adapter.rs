//! Asset universe read from a CSV with a ticker and a sector-ETF column.

use crate::domain::error::SwingscanError;
use crate::domain::universe::Asset;
use crate::ports::asset_port::AssetPort;
use std::path::PathBuf;

pub struct AssetCsvAdapter {
    path: PathBuf,
}

/// Trimmed, lowercased, spaces replaced by underscores.
pub(crate) fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Index of the first header satisfying `pred`, or `MissingColumn`.
pub(crate) fn find_column(
    headers: &[String],
    file: &std::path::Path,
    column: &str,
    pred: impl Fn(&str) -> bool,
) -> Result<usize, SwingscanError> {
    headers
        .iter()
        .position(|h| pred(h))
        .ok_or_else(|| SwingscanError::MissingColumn {
            file: file.display().to_string(),
            column: column.to_string(),
        })
}

impl AssetCsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AssetPort for AssetCsvAdapter {
    fn list_assets(&self) -> Result<Vec<Asset>, SwingscanError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| SwingscanError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| SwingscanError::Data {
                reason: format!("{}: {}", self.path.display(), e),
            })?
            .iter()
            .map(normalize_header)
            .collect();

        let ticker_col = find_column(&headers, &self.path, "ticker", |h| h == "ticker")?;
        let etf_col = find_column(&headers, &self.path, "sector etf", |h| {
            h.contains("sector") && h.contains("etf")
        })?;

        let mut assets = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SwingscanError::Data {
                reason: format!("{}: {}", self.path.display(), e),
            })?;
            let ticker = record.get(ticker_col).unwrap_or("").trim();
            if ticker.is_empty() {
                continue;
            }
            assets.push(Asset::new(ticker, record.get(etf_col)));
        }

        Ok(assets)
    }
}
