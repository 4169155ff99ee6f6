//! OHLCV bar representation.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        Bar {
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
