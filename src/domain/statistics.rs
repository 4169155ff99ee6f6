//! Performance statistics over a finished run.

use std::fmt;

use super::simulator::Simulator;

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub initial_cash: f64,
    pub ending_equity: f64,
    pub total_profit: f64,
    pub trades_closed: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent; `None` when nothing has closed.
    pub win_rate: Option<f64>,
    pub max_drawdown: f64,
    pub trades_active: usize,
    pub total_return: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
}

impl Statistics {
    pub fn compute(simulator: &Simulator) -> Self {
        let initial_cash = simulator.config().initial_cash;
        let final_close = simulator.last_close().unwrap_or(0.0);
        let ending_equity = simulator.mark_to_market(final_close);

        let profits: Vec<f64> = simulator
            .trade_log()
            .iter()
            .filter(|event| event.is_exit())
            .filter_map(|event| event.profit)
            .collect();

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_wins = 0.0_f64;
        let mut gross_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for &profit in &profits {
            if profit > 0.0 {
                wins += 1;
                gross_wins += profit;
                largest_win = largest_win.max(profit);
            } else {
                losses += 1;
                gross_losses += profit.abs();
                largest_loss = largest_loss.max(profit.abs());
            }
        }

        let win_rate = if wins + losses > 0 {
            Some(100.0 * wins as f64 / (wins + losses) as f64)
        } else {
            None
        };

        let profit_factor = if gross_losses > 0.0 {
            gross_wins / gross_losses
        } else if gross_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let total_return = if initial_cash > 0.0 {
            (ending_equity - initial_cash) / initial_cash
        } else {
            0.0
        };

        Statistics {
            initial_cash,
            ending_equity,
            total_profit: profits.iter().fold(0.0, |acc, p| acc + p),
            trades_closed: profits.len(),
            wins,
            losses,
            win_rate,
            max_drawdown: max_drawdown(simulator.equity_curve()),
            trades_active: simulator
                .active_trades()
                .iter()
                .filter(|trade| trade.is_active())
                .count(),
            total_return,
            largest_win,
            largest_loss,
            profit_factor,
        }
    }

    pub fn win_rate_display(&self) -> String {
        match self.win_rate {
            Some(rate) => format!("{:.1}%", rate),
            None => "-".to_string(),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ending equity:  {:.2}", self.ending_equity)?;
        writeln!(f, "Total P/L:      {:.2}", self.total_profit)?;
        writeln!(f, "Trades closed:  {}", self.trades_closed)?;
        writeln!(f, "Win rate:       {}", self.win_rate_display())?;
        writeln!(f, "Max drawdown:   {:.2}", self.max_drawdown)?;
        write!(f, "Trades active:  {}", self.trades_active)
    }
}

/// Highest minus lowest equity over the whole curve, in either order.
fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }
    let peak = equity_curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let trough = equity_curve.iter().copied().fold(f64::INFINITY, f64::min);
    peak - trough
}
