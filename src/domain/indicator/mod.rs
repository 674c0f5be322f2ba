//! Technical indicator computation.
//!
//! [`enrich`] annotates a raw price series with an [`IndicatorSet`] per bar.
//! Fields are `None` until the indicator's warm-up is complete;
//! [`trim_warmup`] drops every bar that cannot yet be evaluated.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod volume;

use crate::domain::ohlcv::PriceBar;

pub const EMA_SHORT: usize = 20;
pub const EMA_MEDIUM: usize = 50;
pub const EMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const VOLUME_MA_PERIOD: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSet {
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub atr14: Option<f64>,
    pub volume_ma20: Option<f64>,
}

impl IndicatorSet {
    /// True when every field used by the trend rule is defined.
    ///
    /// `volume_ma20` is not part of the trimming set; its warm-up is shorter
    /// than EMA200's so it is always defined on a complete bar.
    pub fn is_complete(&self) -> bool {
        self.ema20.is_some()
            && self.ema50.is_some()
            && self.ema200.is_some()
            && self.rsi14.is_some()
            && self.macd.is_some()
            && self.macd_signal.is_some()
            && self.atr14.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub bar: PriceBar,
    pub indicators: IndicatorSet,
}

/// Number of leading bars that can never carry a complete [`IndicatorSet`].
pub fn warmup_len() -> usize {
    let macd_signal = macd::DEFAULT_SLOW - 1 + macd::DEFAULT_SIGNAL - 1;
    (EMA_LONG - 1)
        .max(EMA_MEDIUM - 1)
        .max(EMA_SHORT - 1)
        .max(RSI_PERIOD)
        .max(ATR_PERIOD)
        .max(macd_signal)
}

pub fn enrich(bars: &[PriceBar]) -> Vec<EnrichedBar> {
    let ema20 = ema::calculate_ema(bars, EMA_SHORT);
    let ema50 = ema::calculate_ema(bars, EMA_MEDIUM);
    let ema200 = ema::calculate_ema(bars, EMA_LONG);
    let rsi14 = rsi::calculate_rsi(bars, RSI_PERIOD);
    let macd = macd::calculate_macd_default(bars);
    let atr14 = atr::calculate_atr(bars, ATR_PERIOD);
    let volume_ma20 = volume::calculate_volume_ma(bars, VOLUME_MA_PERIOD);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar: bar.clone(),
            indicators: IndicatorSet {
                ema20: ema20[i],
                ema50: ema50[i],
                ema200: ema200[i],
                rsi14: rsi14[i],
                macd: macd.line[i],
                macd_signal: macd.signal[i],
                atr14: atr14[i],
                volume_ma20: volume_ma20[i],
            },
        })
        .collect()
}

pub fn trim_warmup(enriched: Vec<EnrichedBar>) -> Vec<EnrichedBar> {
    enriched
        .into_iter()
        .filter(|b| b.indicators.is_complete())
        .collect()
}

/// Enrich and trim in one step.
pub fn prepare(bars: &[PriceBar]) -> Vec<EnrichedBar> {
    trim_warmup(enrich(bars))
}
