//! Local support/resistance pivot detection.

use crate::domain::indicator::EnrichedBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub price: f64,
    pub volume: f64,
    /// Index into the slice passed to [`find_last_pivot`].
    pub bar_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotConfig {
    pub lookback: usize,
    pub left: usize,
    pub right: usize,
}

impl Default for PivotConfig {
    fn default() -> Self {
        PivotConfig {
            lookback: 30,
            left: 3,
            right: 3,
        }
    }
}

/// Most recent pivot of `kind` within the last `config.lookback` bars.
///
/// A support pivot's low is strictly below the `left` lows before it and the
/// `right` lows after it; resistance is the mirror image on highs. Candidates
/// too close to either edge of the window are not considered.
pub fn find_last_pivot(bars: &[EnrichedBar], kind: PivotKind, config: &PivotConfig) -> Option<Pivot> {
    let window_start = bars.len().saturating_sub(config.lookback);
    let window = &bars[window_start..];

    let price = |b: &EnrichedBar| match kind {
        PivotKind::Support => b.bar.low,
        PivotKind::Resistance => b.bar.high,
    };
    let beats = |candidate: f64, other: f64| match kind {
        PivotKind::Support => candidate < other,
        PivotKind::Resistance => candidate > other,
    };

    let end = window.len().saturating_sub(config.right);
    let mut last = None;

    for i in config.left..end {
        let candidate = price(&window[i]);
        let left_ok = (1..=config.left).all(|j| beats(candidate, price(&window[i - j])));
        let right_ok = (1..=config.right).all(|j| beats(candidate, price(&window[i + j])));
        if left_ok && right_ok {
            last = Some(Pivot {
                price: candidate,
                volume: window[i].bar.volume,
                bar_index: window_start + i,
            });
        }
    }

    last
}
