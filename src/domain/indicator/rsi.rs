//! RSI (Relative Strength Index) over the trailing closes.
//!
//! Simple (unsmoothed) averages of the last `period` single-tick changes:
//! - gain = max(0, delta), loss = max(0, -delta)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - If avg_loss == 0: RSI = 100
//!
//! Warmup: needs `period + 1` closes to produce `period` changes.

use super::IndicatorValue;

pub fn compute_rsi(closes: &[f64], period: usize) -> IndicatorValue {
    if period == 0 || closes.len() < period + 1 {
        return IndicatorValue::Undefined;
    }

    let tail = &closes[closes.len() - (period + 1)..];
    let (gains, losses) = tail.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let change = w[1] - w[0];
        (g + change.max(0.0), l + (-change).max(0.0))
    });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return IndicatorValue::Defined(100.0);
    }
    IndicatorValue::Defined(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
