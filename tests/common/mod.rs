#![allow(dead_code)]

pub use simtrader::domain::ohlcv::Bar;
use simtrader::domain::error::SimtraderError;
use simtrader::domain::indicator::BreakoutMode;
use simtrader::domain::simulator::SimulatorConfig;
use simtrader::ports::data_port::{BarStream, DataPort};
use std::io::Write;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    /// Fails the stream after this many bars.
    pub fail_after: Option<usize>,
    pub open_error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            fail_after: None,
            open_error: None,
        }
    }

    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn failing_to_open(mut self, reason: &str) -> Self {
        self.open_error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn open_stream(&self) -> Result<BarStream<'_>, SimtraderError> {
        if let Some(reason) = &self.open_error {
            return Err(SimtraderError::data(reason.clone()));
        }
        let limit = self.fail_after;
        Ok(Box::new(self.bars.iter().enumerate().map(move |(i, bar)| {
            match limit {
                Some(n) if i >= n => Err(SimtraderError::data(format!("row {}: broken", i + 1))),
                _ => Ok(*bar),
            }
        })))
    }
}

/// Bar with open at the close and a one-point range either side.
pub fn make_bar(close: f64) -> Bar {
    Bar::new(close, close + 1.0, close - 1.0, close, 1000)
}

/// Closes rising by +3 / -2 alternately: 100, 103, 101, 104, 102, ...
///
/// RSI(14) over this series is 60 and the short average stays above the
/// long one.
pub fn zigzag_close(tick: usize) -> f64 {
    let k = (tick / 2) as f64;
    if tick % 2 == 0 { 100.0 + k } else { 103.0 + k }
}

pub fn zigzag_bars(count: usize) -> Vec<Bar> {
    (0..count).map(|i| make_bar(zigzag_close(i))).collect()
}

/// 30 zigzag bars followed by a bar at tick 30 whose high spikes 10% above
/// its close of 115, enough to clear the prior-window breakout.
pub fn breakout_bars() -> Vec<Bar> {
    let mut bars = zigzag_bars(30);
    bars.push(Bar::new(115.0, 126.5, 114.0, 115.0, 1000));
    bars
}

pub fn prior_window_config() -> SimulatorConfig {
    SimulatorConfig {
        breakout_mode: BreakoutMode::PriorWindow,
        ..SimulatorConfig::default()
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
