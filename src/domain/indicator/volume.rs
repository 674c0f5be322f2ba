//! Rolling simple mean of volume.

use crate::domain::ohlcv::PriceBar;

pub fn calculate_volume_ma(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() < period {
        return out;
    }

    let mut sum: f64 = bars[..period].iter().map(|b| b.volume).sum();
    out[period - 1] = Some(sum / period as f64);

    for i in period..bars.len() {
        sum += bars[i].volume - bars[i - period].volume;
        out[i] = Some(sum / period as f64);
    }

    out
}
