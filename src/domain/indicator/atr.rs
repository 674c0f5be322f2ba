//! Average True Range with Wilder smoothing.
//!
//! True range needs a previous close, so the first TR is at index 1 and the
//! first ATR (simple mean of `period` TRs) lands at index `period`.

use crate::domain::ohlcv::PriceBar;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() <= period {
        return out;
    }

    let tr: Vec<f64> = bars
        .windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .collect();

    let mut atr = tr[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(atr);

    for j in period..tr.len() {
        atr = (atr * (period - 1) as f64 + tr[j]) / period as f64;
        out[j + 1] = Some(atr);
    }

    out
}
