//! Synthetic random-walk bar source.
//!
//! Each bar opens within `volatility` of the previous close, extends up to
//! `1.5 * volatility` above and below the open, and closes uniformly inside
//! its own range. Emitted prices are rounded to cents; the walk itself
//! continues from the unrounded close.

use crate::domain::error::SimtraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{BarStream, DataPort};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANGE_MULTIPLIER: f64 = 1.5;
const MIN_VOLUME: i64 = 100;
const MAX_VOLUME: i64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticAdapter {
    start_price: f64,
    volatility: f64,
    ticks: usize,
    seed: Option<u64>,
}

impl SyntheticAdapter {
    pub fn new(
        start_price: f64,
        volatility: f64,
        ticks: usize,
        seed: Option<u64>,
    ) -> Result<Self, SimtraderError> {
        if !start_price.is_finite() || start_price <= 0.0 {
            return Err(SimtraderError::invalid(
                "generator",
                "start_price",
                "start_price must be positive",
            ));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(SimtraderError::invalid(
                "generator",
                "volatility",
                "volatility must be non-negative",
            ));
        }
        Ok(Self {
            start_price,
            volatility,
            ticks,
            seed,
        })
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn bars(&self) -> SyntheticBars {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SyntheticBars {
            rng,
            price: self.start_price,
            volatility: self.volatility,
            remaining: self.ticks,
        }
    }
}

impl DataPort for SyntheticAdapter {
    fn open_stream(&self) -> Result<BarStream<'_>, SimtraderError> {
        Ok(Box::new(self.bars().map(Ok)))
    }
}

pub struct SyntheticBars {
    rng: StdRng,
    price: f64,
    volatility: f64,
    remaining: usize,
}

impl SyntheticBars {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

impl Iterator for SyntheticBars {
    type Item = Bar;

    fn next(&mut self) -> Option<Bar> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let v = self.volatility;
        let open = self.price + self.uniform(-v, v);
        let high = open + self.uniform(0.0, v * RANGE_MULTIPLIER).abs();
        let low = open - self.uniform(0.0, v * RANGE_MULTIPLIER).abs();
        let close = low + self.uniform(0.0, 1.0) * (high - low);
        let volume = self.rng.gen_range(MIN_VOLUME..=MAX_VOLUME);

        self.price = close;

        Some(Bar::new(
            round_cents(open),
            round_cents(high),
            round_cents(low),
            round_cents(close),
            volume,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
