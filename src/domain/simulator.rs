//! Backtest engine: per-tick state machine over a stream of bars.
//!
//! Each tick runs, in order: history update, mark-to-market, stop-loss pass,
//! indicator snapshot, entry evaluation, signal-exit pass.

use tracing::{debug, info};

use super::indicator::{
    BreakoutMode, IndicatorValue, compute_rsi, compute_volatility, moving_average,
};
use super::ohlcv::Bar;
use super::trade::{Trade, TradeEvent, TradeEventKind};

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;
pub const DEFAULT_RISK_PER_TRADE: f64 = 0.02;
pub const DEFAULT_MAX_TRADES: usize = 3;
pub const DEFAULT_STOP_LOSS_PCT: f64 = 0.03;
pub const DEFAULT_SHORT_WINDOW: usize = 7;
pub const DEFAULT_LONG_WINDOW: usize = 21;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_VOL_WINDOW: usize = 10;
pub const DEFAULT_BREAKOUT_PCT: f64 = 1.5;

/// Entries need RSI strictly below this.
pub const RSI_ENTRY_CEILING: f64 = 70.0;
/// RSI strictly above this forces an exit.
pub const RSI_EXIT_FLOOR: f64 = 75.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub initial_cash: f64,
    /// Fraction of initial cash risked per entry.
    pub risk_per_trade: f64,
    pub max_trades: usize,
    /// Fraction below entry price for the stop.
    pub stop_loss_pct: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub vol_window: usize,
    /// Percent above the rolling max high.
    pub breakout_pct: f64,
    pub breakout_mode: BreakoutMode,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            risk_per_trade: DEFAULT_RISK_PER_TRADE,
            max_trades: DEFAULT_MAX_TRADES,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            rsi_period: DEFAULT_RSI_PERIOD,
            vol_window: DEFAULT_VOL_WINDOW,
            breakout_pct: DEFAULT_BREAKOUT_PCT,
            breakout_mode: BreakoutMode::default(),
        }
    }
}

/// Indicator values computed once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub short_ma: IndicatorValue,
    pub long_ma: IndicatorValue,
    pub rsi: IndicatorValue,
    pub volatility: IndicatorValue,
    pub breakout: bool,
}

impl Signals {
    pub fn is_buy(&self) -> bool {
        match (self.short_ma, self.long_ma, self.rsi, self.volatility) {
            (
                IndicatorValue::Defined(short),
                IndicatorValue::Defined(long),
                IndicatorValue::Defined(rsi),
                IndicatorValue::Defined(_),
            ) => short > long && rsi < RSI_ENTRY_CEILING && self.breakout,
            _ => false,
        }
    }

    pub fn is_exit(&self) -> bool {
        let trend_down = match (self.short_ma, self.long_ma) {
            (IndicatorValue::Defined(short), IndicatorValue::Defined(long)) => short < long,
            _ => false,
        };
        let overbought = match self.rsi {
            IndicatorValue::Defined(rsi) => rsi > RSI_EXIT_FLOOR,
            IndicatorValue::Undefined => false,
        };
        trend_down || overbought
    }
}

/// Result of an entry sizing attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryResult {
    Entered { quantity: i64, cost: f64 },
    InsufficientCash,
}

/// Whole-share sizing from the per-trade risk budget, clamped to `cash`.
///
/// `quantity = floor(risk_amount / (price * stop_loss_pct))`, at least 1. If
/// that costs more than `cash` it drops to `floor(cash / price)`.
pub fn size_entry(risk_amount: f64, price: f64, stop_loss_pct: f64, cash: f64) -> EntryResult {
    if price.is_nan() || price <= 0.0 || cash <= 0.0 {
        return EntryResult::InsufficientCash;
    }

    let mut quantity = (risk_amount / (price * stop_loss_pct)).floor() as i64;
    if quantity < 1 {
        quantity = 1;
    }

    if quantity as f64 * price > cash {
        quantity = (cash / price).floor() as i64;
        // floor(cash / price) can round up past the true quotient
        if quantity > 0 && quantity as f64 * price > cash {
            quantity -= 1;
        }
    }

    if quantity <= 0 {
        return EntryResult::InsufficientCash;
    }

    EntryResult::Entered {
        quantity,
        cost: quantity as f64 * price,
    }
}

#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    cash: f64,
    price_history: Vec<Bar>,
    close_history: Vec<f64>,
    high_history: Vec<f64>,
    low_history: Vec<f64>,
    active_trades: Vec<Trade>,
    closed_trades: Vec<Trade>,
    trade_log: Vec<TradeEvent>,
    equity_curve: Vec<f64>,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Simulator {
            cash: config.initial_cash,
            config,
            price_history: Vec::new(),
            close_history: Vec::new(),
            high_history: Vec::new(),
            low_history: Vec::new(),
            active_trades: Vec::new(),
            closed_trades: Vec::new(),
            trade_log: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn price_history(&self) -> &[Bar] {
        &self.price_history
    }

    pub fn close_history(&self) -> &[f64] {
        &self.close_history
    }

    pub fn active_trades(&self) -> &[Trade] {
        &self.active_trades
    }

    pub fn closed_trades(&self) -> &[Trade] {
        &self.closed_trades
    }

    pub fn trade_log(&self) -> &[TradeEvent] {
        &self.trade_log
    }

    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn tick_count(&self) -> usize {
        self.price_history.len()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_history.last().copied()
    }

    /// Cash plus open positions valued at `price`.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        self.cash
            + self
                .active_trades
                .iter()
                .map(|trade| trade.market_value(price))
                .sum::<f64>()
    }

    /// Indicator snapshot over the full history.
    pub fn signals(&self) -> Signals {
        let c = &self.config;
        Signals {
            short_ma: moving_average(&self.close_history, c.short_window),
            long_ma: moving_average(&self.close_history, c.long_window),
            rsi: compute_rsi(&self.close_history, c.rsi_period),
            volatility: compute_volatility(&self.high_history, &self.low_history, c.vol_window),
            breakout: c
                .breakout_mode
                .detect(&self.high_history, c.vol_window, c.breakout_pct),
        }
    }

    pub fn on_tick(&mut self, bar: Bar) {
        let tick = self.price_history.len();
        let price = bar.close;

        self.price_history.push(bar);
        self.close_history.push(bar.close);
        self.high_history.push(bar.high);
        self.low_history.push(bar.low);

        let equity = self.mark_to_market(price);
        self.equity_curve.push(equity);

        self.run_stop_losses(bar.low, tick);

        let signals = self.signals();

        if self.can_enter(price) && signals.is_buy() {
            self.enter(price, tick, &signals);
        }

        if signals.is_exit() {
            self.exit_all(price, tick);
        }
    }

    pub fn run<I>(&mut self, bars: I)
    where
        I: IntoIterator<Item = Bar>,
    {
        for bar in bars {
            self.on_tick(bar);
        }
    }

    /// Feeds bars until the stream ends or yields an error.
    pub fn try_run<I, E>(&mut self, bars: I) -> Result<(), E>
    where
        I: IntoIterator<Item = Result<Bar, E>>,
    {
        for bar in bars {
            self.on_tick(bar?);
        }
        Ok(())
    }

    fn can_enter(&self, price: f64) -> bool {
        self.active_trades.len() < self.config.max_trades && self.cash > 0.0 && price > 0.0
    }

    fn run_stop_losses(&mut self, low: f64, tick: usize) {
        let trades = std::mem::take(&mut self.active_trades);
        for mut trade in trades {
            if !trade.try_exit(low, tick) {
                self.active_trades.push(trade);
                continue;
            }
            if let Some(event) = TradeEvent::exit(TradeEventKind::StopLossExit, &trade) {
                info!(
                    tick,
                    "SL-EXIT at {:.2}, qty={}, profit={:.2}",
                    event.exit_price.unwrap_or_default(),
                    event.quantity,
                    event.profit.unwrap_or_default()
                );
                self.trade_log.push(event);
            }
            if let Some(exit_price) = trade.exit_price() {
                self.cash += exit_price * trade.quantity as f64;
            }
            self.closed_trades.push(trade);
        }
    }

    fn enter(&mut self, price: f64, tick: usize, signals: &Signals) {
        let risk_amount = self.config.initial_cash * self.config.risk_per_trade;
        match size_entry(risk_amount, price, self.config.stop_loss_pct, self.cash) {
            EntryResult::Entered { quantity, cost } => {
                let stop = price * (1.0 - self.config.stop_loss_pct);
                let trade = Trade::open(tick, quantity, price, Some(stop));
                self.cash -= cost;
                info!(
                    tick,
                    "ENTRY at {:.2}, qty={}, stop={:.2}, RSI={}, Vol={}",
                    price,
                    quantity,
                    stop,
                    signals.rsi,
                    signals.volatility
                );
                self.trade_log.push(TradeEvent::entry(tick, &trade));
                self.active_trades.push(trade);
            }
            EntryResult::InsufficientCash => {
                debug!(tick, cash = self.cash, price, "entry skipped: insufficient cash");
            }
        }
    }

    fn exit_all(&mut self, price: f64, tick: usize) {
        let trades = std::mem::take(&mut self.active_trades);
        for mut trade in trades {
            if !trade.is_active() {
                self.active_trades.push(trade);
                continue;
            }
            trade.close(price, tick);
            self.cash += price * trade.quantity as f64;
            if let Some(event) = TradeEvent::exit(TradeEventKind::ManualExit, &trade) {
                info!(
                    tick,
                    "MANUAL-EXIT at {:.2}, profit={:.2}",
                    price,
                    event.profit.unwrap_or_default()
                );
                self.trade_log.push(event);
            }
            self.closed_trades.push(trade);
        }
    }
}
