//! Average high-low range over the trailing bars.

use super::IndicatorValue;

pub fn compute_volatility(highs: &[f64], lows: &[f64], window: usize) -> IndicatorValue {
    let len = highs.len().min(lows.len());
    if window == 0 || len < window {
        return IndicatorValue::Undefined;
    }

    let total: f64 = highs[highs.len() - window..]
        .iter()
        .zip(&lows[lows.len() - window..])
        .map(|(h, l)| h - l)
        .sum();
    IndicatorValue::Defined(total / window as f64)
}
