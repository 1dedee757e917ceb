//! Delimited text report adapter implementing ReportPort.
//!
//! Per-bar signals and the trade log are written as CSV, the summary as
//! `key=value` lines.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::domain::backtest::{BacktestResult, Trade};
use crate::domain::error::LwtrendError;
use crate::domain::indicator::SignalPoint;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::PipelineOutput;
use crate::ports::report_port::ReportPort;

const SIGNAL_HEADER: [&str; 13] = [
    "timestamp",
    "close",
    "lwti_momentum",
    "lwti_signal",
    "vwap",
    "upper",
    "lower",
    "vwap_signal",
    "regime_vol",
    "regime",
    "strategy_score",
    "strategy_position",
    "strategy_signal",
];

const TRADE_HEADER: [&str; 5] = ["timestamp", "signal", "price", "quantity", "pnl"];

pub struct DelimitedReportAdapter;

impl DelimitedReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DelimitedReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_stdout(output_path: &str) -> bool {
    output_path == "-" || output_path.eq_ignore_ascii_case("stdout")
}

fn open_destination(output_path: &str) -> io::Result<Box<dyn Write>> {
    if is_stdout(output_path) {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(BufWriter::new(File::create(output_path)?)))
    }
}

fn write_error(output_path: &str, reason: impl ToString) -> LwtrendError {
    LwtrendError::ReportWrite {
        path: output_path.to_string(),
        reason: reason.to_string(),
    }
}

fn fixed6(value: f64) -> String {
    format!("{value:.6}")
}

fn signal_field(point: &impl SignalPoint) -> String {
    point.signal().to_string()
}

/// Writes one row per bar. Rows stop at the shortest of the aligned series.
pub fn render_signals<W: Write>(
    writer: W,
    bars: &[OhlcvBar],
    output: &PipelineOutput,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SIGNAL_HEADER)?;

    let rows = bars
        .iter()
        .zip(&output.trend)
        .zip(&output.bands)
        .zip(&output.regimes)
        .zip(&output.strategy);
    for ((((bar, trend), band), regime), strat) in rows {
        wtr.write_record([
            strat.timestamp().to_string(),
            fixed6(bar.close),
            fixed6(trend.momentum),
            signal_field(trend),
            fixed6(band.vwap),
            fixed6(band.upper),
            fixed6(band.lower),
            signal_field(band),
            fixed6(regime.realized_vol),
            regime.regime.to_string(),
            fixed6(strat.score),
            fixed6(strat.position),
            signal_field(strat),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn render_summary<W: Write>(mut writer: W, result: &BacktestResult) -> io::Result<()> {
    writeln!(writer, "starting_equity={:.4}", result.starting_equity)?;
    writeln!(writer, "ending_equity={:.4}", result.ending_equity)?;
    writeln!(writer, "return_pct={:.4}", result.total_return() * 100.0)?;
    writeln!(writer, "max_drawdown_pct={:.4}", result.max_drawdown * 100.0)?;
    writeln!(writer, "trades={}", result.trades)?;
    writeln!(writer, "win_rate_pct={:.4}", result.win_rate * 100.0)?;
    writer.flush()
}

pub fn render_trades<W: Write>(writer: W, trades: &[Trade]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TRADE_HEADER)?;
    for trade in trades {
        wtr.write_record([
            trade.timestamp.clone(),
            trade.signal.to_string(),
            fixed6(trade.price),
            fixed6(trade.quantity),
            fixed6(trade.pnl),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for DelimitedReportAdapter {
    fn write_signals(
        &self,
        bars: &[OhlcvBar],
        output: &PipelineOutput,
        output_path: &str,
    ) -> Result<(), LwtrendError> {
        let dest = open_destination(output_path).map_err(|e| write_error(output_path, e))?;
        render_signals(dest, bars, output).map_err(|e| write_error(output_path, e))?;
        tracing::debug!(path = output_path, rows = bars.len(), "signals written");
        Ok(())
    }

    fn write_summary(
        &self,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), LwtrendError> {
        let dest = open_destination(output_path).map_err(|e| write_error(output_path, e))?;
        render_summary(dest, result).map_err(|e| write_error(output_path, e))
    }

    fn write_trades(&self, trades: &[Trade], output_path: &str) -> Result<(), LwtrendError> {
        let dest = open_destination(output_path).map_err(|e| write_error(output_path, e))?;
        render_trades(dest, trades).map_err(|e| write_error(output_path, e))?;
        tracing::debug!(path = output_path, trades = trades.len(), "trade log written");
        Ok(())
    }
}
