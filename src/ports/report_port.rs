//! Report generation port trait.

use crate::domain::error::SimtraderError;
use crate::domain::simulator::Simulator;
use crate::domain::statistics::Statistics;

/// Port for writing the results of a finished run.
pub trait ReportPort {
    fn write(&self, simulator: &Simulator, statistics: &Statistics) -> Result<(), SimtraderError>;
}
