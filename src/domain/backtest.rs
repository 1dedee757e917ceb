//! Bar-by-bar backtest simulator.
//!
//! Replays the composite target-position stream against closing prices. Each
//! bar marks the open quantity to market, updates peak equity and drawdown,
//! rebalances toward `equity * risk_per_trade * position / price`, charges
//! fees and slippage on the traded quantity, and records a trade whenever an
//! open position goes flat or flips sign. A position still open after the
//! last bar is force-closed there.

use crate::domain::composite::StrategyPoint;
use crate::domain::finite_or;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::Signal;

/// Quantity changes at or below this are not traded.
pub const QUANTITY_EPSILON: f64 = 1e-9;
pub const MIN_STARTING_EQUITY: f64 = 1000.0;
const BPS: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_equity: f64,
    /// Fraction of equity allocated per unit of target position.
    pub risk_per_trade: f64,
    pub fee_bps: f64,
    pub slippage_bps: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            starting_equity: 100_000.0,
            risk_per_trade: 0.02,
            fee_bps: 1.0,
            slippage_bps: 1.0,
        }
    }
}

impl BacktestConfig {
    /// Non-finite values fall back to the defaults before range clamping.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            starting_equity: finite_or(self.starting_equity, defaults.starting_equity)
                .max(MIN_STARTING_EQUITY),
            risk_per_trade: finite_or(self.risk_per_trade, defaults.risk_per_trade)
                .clamp(0.0, 1.0),
            fee_bps: finite_or(self.fee_bps, defaults.fee_bps).max(0.0),
            slippage_bps: finite_or(self.slippage_bps, defaults.slippage_bps).max(0.0),
        }
    }

    fn cost_rate(&self) -> f64 {
        (self.fee_bps + self.slippage_bps) / BPS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Timestamp of the bar on which the position was closed.
    pub timestamp: String,
    /// Signal that opened the position.
    pub signal: Signal,
    pub price: f64,
    /// Signed quantity that was closed.
    pub quantity: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BacktestResult {
    pub starting_equity: f64,
    pub ending_equity: f64,
    pub max_drawdown: f64,
    pub trades: usize,
    pub win_rate: f64,
    pub trade_log: Vec<Trade>,
}

impl BacktestResult {
    fn unchanged(starting_equity: f64) -> Self {
        Self {
            starting_equity,
            ending_equity: starting_equity,
            ..Self::default()
        }
    }

    /// (ending - starting) / starting, or 0 for a non-positive start.
    pub fn total_return(&self) -> f64 {
        if self.starting_equity > 0.0 {
            (self.ending_equity - self.starting_equity) / self.starting_equity
        } else {
            0.0
        }
    }
}

/// State carried across bars within one `run`.
struct Book {
    equity: f64,
    peak: f64,
    max_drawdown: f64,
    quantity: f64,
    entry_equity: f64,
    entry_signal: Signal,
    wins: usize,
    log: Vec<Trade>,
}

impl Book {
    fn new(equity: f64) -> Self {
        Self {
            equity,
            peak: equity,
            max_drawdown: 0.0,
            quantity: 0.0,
            entry_equity: equity,
            entry_signal: Signal::Flat,
            wins: 0,
            log: Vec::new(),
        }
    }

    fn mark_to_market(&mut self, price_change: f64) {
        self.equity += self.quantity * price_change;
        self.peak = self.peak.max(self.equity);
        if self.peak > 0.0 {
            let drawdown = ((self.peak - self.equity) / self.peak).min(1.0);
            self.max_drawdown = self.max_drawdown.max(drawdown);
        }
    }

    fn close(&mut self, timestamp: &str, price: f64) {
        let pnl = self.equity - self.entry_equity;
        tracing::debug!(
            timestamp,
            signal = %self.entry_signal,
            quantity = self.quantity,
            price,
            pnl,
            "closed trade"
        );
        self.log.push(Trade {
            timestamp: timestamp.to_string(),
            signal: self.entry_signal,
            price,
            quantity: self.quantity,
            pnl,
        });
        if pnl > 0.0 {
            self.wins += 1;
        }
    }

    fn open(&mut self, signal: Signal) {
        self.entry_equity = self.equity;
        self.entry_signal = signal;
    }

    fn finish(self, starting_equity: f64) -> BacktestResult {
        let trades = self.log.len();
        let win_rate = if trades > 0 {
            self.wins as f64 / trades as f64
        } else {
            0.0
        };
        BacktestResult {
            starting_equity,
            ending_equity: self.equity,
            max_drawdown: self.max_drawdown,
            trades,
            win_rate,
            trade_log: self.log,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Runs over the first `min(bars.len(), strategy.len())` aligned bars.
    pub fn run(&self, bars: &[OhlcvBar], strategy: &[StrategyPoint]) -> BacktestResult {
        let n = bars.len().min(strategy.len());
        let starting_equity = self.config.starting_equity;
        if n < 2 {
            return BacktestResult::unchanged(starting_equity);
        }

        let mut book = Book::new(starting_equity);
        let mut prev_close = bars[0].close;

        for (bar, point) in bars[1..n].iter().zip(&strategy[1..n]) {
            let price = bar.close;
            book.mark_to_market(price - prev_close);
            prev_close = price;

            let target_value = book.equity * self.config.risk_per_trade * point.position;
            let mut target_qty = if price != 0.0 {
                target_value / price
            } else {
                0.0
            };
            if !target_qty.is_finite() {
                target_qty = 0.0;
            }

            let delta = target_qty - book.quantity;
            if delta.abs() > QUANTITY_EPSILON {
                book.equity -= delta.abs() * price * self.config.cost_rate();
            }

            let flips = book.quantity * target_qty < 0.0;
            if book.quantity != 0.0 && (target_qty == 0.0 || flips) {
                book.close(&bar.timestamp, price);
            }
            if target_qty != 0.0 && (book.quantity == 0.0 || flips) {
                book.open(point.signal);
            }

            book.quantity = target_qty;
        }

        if book.quantity != 0.0 {
            let last = &bars[n - 1];
            book.close(&last.timestamp, last.close);
        }

        book.finish(starting_equity)
    }
}

impl Default for Backtester {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}
