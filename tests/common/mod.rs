#![allow(dead_code)]

use lwtrend::domain::backtest::{BacktestResult, Trade};
use lwtrend::domain::error::LwtrendError;
pub use lwtrend::domain::ohlcv::OhlcvBar;
use lwtrend::domain::pipeline::PipelineOutput;
use lwtrend::ports::data_port::DataPort;
use lwtrend::ports::report_port::ReportPort;
use std::cell::RefCell;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<OhlcvBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, LwtrendError> {
        if let Some(reason) = &self.error {
            return Err(LwtrendError::DataRead {
                path: "mock".to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

/// Records which outputs were requested and where.
#[derive(Default)]
pub struct MockReportPort {
    pub signals: RefCell<Vec<(String, usize)>>,
    pub summaries: RefCell<Vec<(String, BacktestResult)>>,
    pub trades: RefCell<Vec<(String, usize)>>,
}

impl ReportPort for MockReportPort {
    fn write_signals(
        &self,
        bars: &[OhlcvBar],
        _output: &PipelineOutput,
        output_path: &str,
    ) -> Result<(), LwtrendError> {
        self.signals
            .borrow_mut()
            .push((output_path.to_string(), bars.len()));
        Ok(())
    }

    fn write_summary(
        &self,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), LwtrendError> {
        self.summaries
            .borrow_mut()
            .push((output_path.to_string(), result.clone()));
        Ok(())
    }

    fn write_trades(&self, trades: &[Trade], output_path: &str) -> Result<(), LwtrendError> {
        self.trades
            .borrow_mut()
            .push((output_path.to_string(), trades.len()));
        Ok(())
    }
}

/// Bar whose typical price equals `close`.
pub fn make_bar(timestamp: &str, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar::new(timestamp, close, close + 1.0, close - 1.0, close, volume)
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(&format!("2024-01-{:02}", i + 1), c, 1000.0))
        .collect()
}

pub fn rising_bars(count: usize, start_price: f64, step: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + step * i as f64).collect();
    bars_from_closes(&closes)
}

pub fn falling_bars(count: usize, start_price: f64, step: f64) -> Vec<OhlcvBar> {
    rising_bars(count, start_price, -step)
}

/// Gentle oscillation around a slow uptrend.
pub fn wavy_bars(count: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.2 * t + 2.0 * (t / 3.0).sin()
        })
        .collect();
    bars_from_closes(&closes)
}

pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    csv
}
