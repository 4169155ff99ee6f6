//! Plain-text report: trade log followed by the statistics summary.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::SimtraderError;
use crate::domain::simulator::Simulator;
use crate::domain::statistics::Statistics;
use crate::domain::trade::TradeEvent;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter {
    output: Option<PathBuf>,
    show_trade_log: bool,
}

impl TextReportAdapter {
    /// Writes to `output`, or stdout when `None`.
    pub fn new(output: Option<PathBuf>, show_trade_log: bool) -> Self {
        Self {
            output,
            show_trade_log,
        }
    }

    pub fn render(&self, simulator: &Simulator, statistics: &Statistics) -> String {
        let mut out = String::new();
        if self.show_trade_log {
            out.push_str("==== TRADE LOG ====\n");
            out.push_str(&format!(
                "{:>6}  {:<12} {:>10} {:>10} {:>8} {:>10}\n",
                "tick", "event", "entry", "exit", "qty", "profit"
            ));
            for event in simulator.trade_log() {
                out.push_str(&format_event(event));
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str("==== STATISTICS ====\n");
        out.push_str(&format!("{}\n", statistics));
        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, simulator: &Simulator, statistics: &Statistics) -> Result<(), SimtraderError> {
        let content = self.render(simulator, statistics);
        match &self.output {
            Some(path) => fs::write(path, content).map_err(|e| SimtraderError::Report {
                reason: format!("failed to write {}: {}", path.display(), e),
            }),
            None => {
                print!("{}", content);
                Ok(())
            }
        }
    }
}

fn format_event(event: &TradeEvent) -> String {
    format!(
        "{:>6}  {:<12} {:>10.2} {:>10} {:>8} {:>10}",
        event.tick,
        event.kind.to_string(),
        event.entry_price,
        optional_price(event.exit_price),
        event.quantity,
        optional_price(event.profit),
    )
}

fn optional_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}
