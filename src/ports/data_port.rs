//! Bar source port trait.

use crate::domain::error::SimtraderError;
use crate::domain::ohlcv::Bar;

/// Lazy, finite, single-pass sequence of bars.
pub type BarStream<'a> = Box<dyn Iterator<Item = Result<Bar, SimtraderError>> + 'a>;

pub trait DataPort {
    fn open_stream(&self) -> Result<BarStream<'_>, SimtraderError>;
}
