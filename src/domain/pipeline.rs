//! One full research pass: indicators, composite strategy, backtest.

use crate::domain::backtest::{BacktestConfig, BacktestResult, Backtester};
use crate::domain::composite::{CompositeConfig, CompositeStrategy, StrategyPoint};
use crate::domain::indicator::Indicator;
use crate::domain::indicator::regime::{RegimeConfig, RegimeIndicator, RegimePoint};
use crate::domain::indicator::trend_momentum::{
    TrendMomentumConfig, TrendMomentumIndicator, TrendMomentumPoint,
};
use crate::domain::indicator::vwap_band::{VwapBandConfig, VwapBandIndicator, VwapBandPoint};
use crate::domain::ohlcv::OhlcvBar;

/// Everything needed for one run. Component configs are stored as given and
/// sanitized when the components are built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub input_path: Option<String>,
    pub lwti: TrendMomentumConfig,
    pub vwap: VwapBandConfig,
    pub regime: RegimeConfig,
    pub strategy: CompositeConfig,
    pub backtest: BacktestConfig,
}

impl RunConfig {
    /// The same configuration with every component section sanitized.
    pub fn sanitized(self) -> Self {
        Self {
            input_path: self.input_path,
            lwti: self.lwti.sanitized(),
            vwap: self.vwap.sanitized(),
            regime: self.regime.sanitized(),
            strategy: self.strategy.sanitized(),
            backtest: self.backtest.sanitized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub trend: Vec<TrendMomentumPoint>,
    pub bands: Vec<VwapBandPoint>,
    pub regimes: Vec<RegimePoint>,
    pub strategy: Vec<StrategyPoint>,
    pub result: BacktestResult,
}

pub fn run_pipeline(bars: &[OhlcvBar], config: &RunConfig) -> PipelineOutput {
    tracing::debug!(bars = bars.len(), "computing indicators");
    let trend = TrendMomentumIndicator::new(config.lwti.clone()).compute(bars);
    let bands = VwapBandIndicator::new(config.vwap.clone()).compute(bars);
    let regimes = RegimeIndicator::new(config.regime.clone()).compute(bars);

    let strategy = CompositeStrategy::new(config.strategy.clone()).generate(&trend, &bands, &regimes);
    tracing::debug!(points = strategy.len(), "generated strategy");

    let result = Backtester::new(config.backtest.clone()).run(bars, &strategy);
    tracing::debug!(
        ending_equity = result.ending_equity,
        trades = result.trades,
        "backtest complete"
    );

    PipelineOutput {
        trend,
        bands,
        regimes,
        strategy,
        result,
    }
}
