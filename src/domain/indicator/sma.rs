//! Simple moving average over the trailing closes.

use super::IndicatorValue;

/// Arithmetic mean of the last `window` closes.
pub fn moving_average(closes: &[f64], window: usize) -> IndicatorValue {
    if window == 0 || closes.len() < window {
        return IndicatorValue::Undefined;
    }
    let tail = &closes[closes.len() - window..];
    IndicatorValue::Defined(tail.iter().sum::<f64>() / window as f64)
}
