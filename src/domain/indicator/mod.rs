//! Technical indicator implementations.
//!
//! Every indicator is a pure function over the price history accumulated so
//! far. Insufficient history is not an error: it yields
//! [`IndicatorValue::Undefined`], which signal evaluation treats as "no signal".

pub mod breakout;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use breakout::{breakout, prior_breakout};
pub use rsi::compute_rsi;
pub use sma::moving_average;
pub use volatility::compute_volatility;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Defined(f64),
    Undefined,
}

impl IndicatorValue {
    pub fn is_defined(&self) -> bool {
        matches!(self, IndicatorValue::Defined(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            IndicatorValue::Defined(v) => Some(*v),
            IndicatorValue::Undefined => None,
        }
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorValue::Defined(v) => write!(f, "{:.2}", v),
            IndicatorValue::Undefined => write!(f, "n/a"),
        }
    }
}

/// Which rolling maximum the breakout detector compares the latest high to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakoutMode {
    /// Trailing window that includes the latest high.
    #[default]
    Inclusive,
    /// The `window` highs before the latest one.
    PriorWindow,
}

impl BreakoutMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inclusive" => Some(BreakoutMode::Inclusive),
            "prior" | "prior_window" => Some(BreakoutMode::PriorWindow),
            _ => None,
        }
    }

    pub fn detect(&self, highs: &[f64], window: usize, breakout_pct: f64) -> bool {
        match self {
            BreakoutMode::Inclusive => breakout(highs, window, breakout_pct),
            BreakoutMode::PriorWindow => prior_breakout(highs, window, breakout_pct),
        }
    }
}

impl fmt::Display for BreakoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakoutMode::Inclusive => write!(f, "inclusive"),
            BreakoutMode::PriorWindow => write!(f, "prior"),
        }
    }
}
