//! Capital reconstruction from the ledger of closed operations.

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Free-text close status, e.g. "TP", "SL hit", "open".
    pub status: String,
    pub estimated_profit: f64,
    pub estimated_loss: f64,
}

pub const DEFAULT_BASE_CAPITAL: f64 = 200.0;

/// `base_capital` plus the estimated profit of every take-profit close, minus
/// the estimated loss of every stop-loss close. Open operations are ignored.
pub fn capital_from_ledger(base_capital: f64, entries: &[LedgerEntry]) -> f64 {
    entries.iter().fold(base_capital, |capital, entry| {
        let status = entry.status.trim().to_lowercase();
        if status.is_empty() || status == "abierta" || status == "open" {
            capital
        } else if status.contains("tp") {
            capital + entry.estimated_profit
        } else if status.contains("sl") {
            capital - entry.estimated_loss
        } else {
            capital
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn entry(status: &str, profit: f64, loss: f64) -> LedgerEntry {
        LedgerEntry {
            status: status.to_string(),
            estimated_profit: profit,
            estimated_loss: loss,
        }
    }

    #[test]
    fn applies_closed_operations() {
        let entries = vec![
            entry("TP", 12.5, 5.0),
            entry(" sl ", 9.0, 4.0),
            entry("Open", 100.0, 100.0),
            entry("", 100.0, 100.0),
            entry("TP parcial", 3.0, 1.0),
        ];
        assert_relative_eq!(capital_from_ledger(200.0, &entries), 200.0 + 12.5 - 4.0 + 3.0);
    }

    #[test]
    fn unknown_status_is_ignored() {
        let entries = vec![entry("cancelled", 10.0, 10.0)];
        assert_relative_eq!(capital_from_ledger(DEFAULT_BASE_CAPITAL, &entries), 200.0);
    }

    #[test]
    fn empty_ledger_is_base() {
        assert_relative_eq!(capital_from_ledger(350.0, &[]), 350.0);
    }
}
