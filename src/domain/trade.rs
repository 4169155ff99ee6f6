//! Trade (position) lifecycle and trade-log records.

use std::fmt;

/// Fill details recorded when a trade closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeExit {
    pub tick: usize,
    pub price: f64,
    pub profit: f64,
}

/// A long position. Open while `exit` is `None`; closes at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_tick: usize,
    pub quantity: i64,
    pub entry_price: f64,
    pub stop_price: Option<f64>,
    exit: Option<TradeExit>,
}

impl Trade {
    pub fn open(entry_tick: usize, quantity: i64, entry_price: f64, stop_price: Option<f64>) -> Self {
        Trade {
            entry_tick,
            quantity,
            entry_price,
            stop_price,
            exit: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.exit.is_none()
    }

    pub fn exit(&self) -> Option<&TradeExit> {
        self.exit.as_ref()
    }

    pub fn exit_tick(&self) -> Option<usize> {
        self.exit.map(|e| e.tick)
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit.map(|e| e.price)
    }

    pub fn profit(&self) -> Option<f64> {
        self.exit.map(|e| e.profit)
    }

    /// Value at `price` while open, at the fill price once closed.
    pub fn market_value(&self, price: f64) -> f64 {
        match self.exit {
            None => self.quantity as f64 * price,
            Some(exit) => self.quantity as f64 * exit.price,
        }
    }

    /// A stop of exactly 0.0 counts as unset.
    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.stop_price {
            Some(stop) if stop != 0.0 => price <= stop && self.quantity > 0,
            _ => false,
        }
    }

    /// Closes at the stop price (not `price`) when `price` breaches the stop.
    pub fn try_exit(&mut self, price: f64, tick: usize) -> bool {
        if !self.is_active() || !self.should_stop_loss(price) {
            return false;
        }
        match self.stop_price {
            Some(stop) => {
                self.fill(stop, tick);
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self, price: f64, tick: usize) {
        if self.is_active() {
            self.fill(price, tick);
        }
    }

    fn fill(&mut self, price: f64, tick: usize) {
        self.exit = Some(TradeExit {
            tick,
            price,
            profit: (price - self.entry_price) * self.quantity as f64,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeEventKind {
    Entry,
    StopLossExit,
    ManualExit,
}

impl fmt::Display for TradeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeEventKind::Entry => write!(f, "ENTRY"),
            TradeEventKind::StopLossExit => write!(f, "SL-EXIT"),
            TradeEventKind::ManualExit => write!(f, "MANUAL-EXIT"),
        }
    }
}

/// One row of the trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub tick: usize,
    pub kind: TradeEventKind,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub quantity: i64,
    pub profit: Option<f64>,
}

impl TradeEvent {
    pub fn entry(tick: usize, trade: &Trade) -> Self {
        TradeEvent {
            tick,
            kind: TradeEventKind::Entry,
            entry_price: trade.entry_price,
            exit_price: None,
            quantity: trade.quantity,
            profit: None,
        }
    }

    /// Exit record for a closed trade; `None` if the trade is still open.
    pub fn exit(kind: TradeEventKind, trade: &Trade) -> Option<Self> {
        let exit = trade.exit()?;
        Some(TradeEvent {
            tick: exit.tick,
            kind,
            entry_price: trade.entry_price,
            exit_price: Some(exit.price),
            quantity: trade.quantity,
            profit: Some(exit.profit),
        })
    }

    pub fn is_exit(&self) -> bool {
        self.kind != TradeEventKind::Entry
    }
}
