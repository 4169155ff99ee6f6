//! Breakout detection against a rolling maximum high.

/// Latest high beats `(1 + breakout_pct / 100)` times the maximum of the
/// trailing `window` highs. The trailing window includes the latest high, so
/// with positive prices and a non-negative threshold this never fires.
pub fn breakout(highs: &[f64], window: usize, breakout_pct: f64) -> bool {
    if window == 0 || highs.len() <= window {
        return false;
    }
    let latest = highs[highs.len() - 1];
    let reference = rolling_max(&highs[highs.len() - window..]);
    latest > reference * (1.0 + breakout_pct / 100.0)
}

/// Same threshold as [`breakout`], measured against the `window` highs that
/// precede the latest one.
pub fn prior_breakout(highs: &[f64], window: usize, breakout_pct: f64) -> bool {
    if window == 0 || highs.len() <= window {
        return false;
    }
    let last = highs.len() - 1;
    let latest = highs[last];
    let reference = rolling_max(&highs[last - window..last]);
    latest > reference * (1.0 + breakout_pct / 100.0)
}

fn rolling_max(highs: &[f64]) -> f64 {
    highs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
