//! Asset universe: tickers and their sector ETFs.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub ticker: String,
    pub sector_etf: Option<String>,
}

impl Asset {
    pub fn new(ticker: &str, sector_etf: Option<&str>) -> Self {
        Asset {
            ticker: ticker.trim().to_uppercase(),
            sector_etf: sector_etf
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Assets without a sector ETF, and the sector ETFs themselves, are not
    /// scanned for signals.
    pub fn is_signal_candidate(&self) -> bool {
        match &self.sector_etf {
            Some(etf) => !etf.is_empty() && *etf != self.ticker,
            None => false,
        }
    }
}

/// Candidate assets in list order.
pub fn signal_candidates(assets: &[Asset]) -> impl Iterator<Item = &Asset> {
    assets.iter().filter(|a| a.is_signal_candidate())
}
