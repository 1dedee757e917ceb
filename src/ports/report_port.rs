//! Report generation port trait.

use crate::domain::backtest::{BacktestResult, Trade};
use crate::domain::error::LwtrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::PipelineOutput;

/// Port for writing run outputs. `output_path` of `-` or `stdout` means
/// standard output.
pub trait ReportPort {
    /// Per-bar indicator and strategy values.
    fn write_signals(
        &self,
        bars: &[OhlcvBar],
        output: &PipelineOutput,
        output_path: &str,
    ) -> Result<(), LwtrendError>;

    /// Aggregate statistics.
    fn write_summary(&self, result: &BacktestResult, output_path: &str)
    -> Result<(), LwtrendError>;

    fn write_trades(&self, trades: &[Trade], output_path: &str) -> Result<(), LwtrendError>;
}
