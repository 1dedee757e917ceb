//! Liquidity-weighted trend/momentum indicator.
//!
//! The typical price is smoothed exponentially with a base factor
//! k = 2/(n+1), scaled per bar by a liquidity weight (bar volume relative to
//! the rolling average volume) and capped at 1. Momentum is the relative
//! change of the smoothed value against `momentum_lookback` bars earlier and
//! is gated by rolling volatility of typical-price returns:
//!
//!   gate = volatility * threshold   (threshold * 1e-4 when below 1e-8)
//!   Long if momentum > gate, Short if momentum < -gate, else Flat.

use crate::domain::finite_or;
use crate::domain::indicator::{DENOMINATOR_EPSILON, Indicator, simple_return};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rolling_window::RollingWindow;
use crate::domain::signal::Signal;

/// Gates below this are treated as degenerate.
pub const GATE_FLOOR: f64 = 1e-8;
/// Fallback gate as a fraction of the threshold.
pub const GATE_FALLBACK_SCALE: f64 = 1e-4;
pub const MIN_VOLUME_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendMomentumConfig {
    pub trend_period: usize,
    pub momentum_lookback: usize,
    pub volatility_window: usize,
    /// Multiplier applied to volatility to form the signal gate.
    pub threshold: f64,
    /// Minimum liquidity weight for thin bars.
    pub volume_floor: f64,
}

impl Default for TrendMomentumConfig {
    fn default() -> Self {
        Self {
            trend_period: 14,
            momentum_lookback: 5,
            volatility_window: 10,
            threshold: 0.7,
            volume_floor: 1.0,
        }
    }
}

impl TrendMomentumConfig {
    /// Windows >= 1, threshold >= 0, volume floor >= 0.1. Non-finite values
    /// fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            trend_period: self.trend_period.max(1),
            momentum_lookback: self.momentum_lookback.max(1),
            volatility_window: self.volatility_window.max(1),
            threshold: finite_or(self.threshold, defaults.threshold).max(0.0),
            volume_floor: finite_or(self.volume_floor, defaults.volume_floor)
                .max(MIN_VOLUME_FLOOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendMomentumPoint {
    pub index: usize,
    pub timestamp: String,
    pub smoothed: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct TrendMomentumIndicator {
    config: TrendMomentumConfig,
}

impl TrendMomentumIndicator {
    pub fn new(config: TrendMomentumConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &TrendMomentumConfig {
        &self.config
    }

    fn liquidity_weight(&self, volume: f64, avg_volume: f64) -> f64 {
        if avg_volume > 0.0 {
            self.config.volume_floor.max(volume / avg_volume)
        } else {
            self.config.volume_floor
        }
    }

    fn gate(&self, volatility: f64) -> f64 {
        let gate = volatility * self.config.threshold;
        if gate < GATE_FLOOR {
            self.config.threshold * GATE_FALLBACK_SCALE
        } else {
            gate
        }
    }
}

impl Default for TrendMomentumIndicator {
    fn default() -> Self {
        Self::new(TrendMomentumConfig::default())
    }
}

impl Indicator for TrendMomentumIndicator {
    type Point = TrendMomentumPoint;

    fn compute(&self, bars: &[OhlcvBar]) -> Vec<TrendMomentumPoint> {
        let Some(first) = bars.first() else {
            return Vec::new();
        };

        let cfg = &self.config;
        let k = 2.0 / (cfg.trend_period as f64 + 1.0);
        let mut volumes = RollingWindow::new(cfg.trend_period);
        let mut returns = RollingWindow::new(cfg.volatility_window);

        let mut prev_tp = first.typical_price();
        let mut smoothed = prev_tp;
        let mut points: Vec<TrendMomentumPoint> = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            let tp = bar.typical_price();

            volumes.push(bar.volume);
            let weight = self.liquidity_weight(bar.volume, volumes.mean());
            let effective_k = (k * weight).min(1.0);
            if i > 0 {
                smoothed = effective_k * tp + (1.0 - effective_k) * smoothed;
            }

            let momentum = if i >= cfg.momentum_lookback {
                let base = points[i - cfg.momentum_lookback].smoothed;
                if base.abs() > DENOMINATOR_EPSILON {
                    (smoothed - base) / base
                } else {
                    smoothed - base
                }
            } else {
                0.0
            };

            if i > 0 {
                returns.push(simple_return(tp, prev_tp));
            }
            prev_tp = tp;
            let volatility = returns.stddev();

            points.push(TrendMomentumPoint {
                index: i,
                timestamp: bar.timestamp.clone(),
                smoothed,
                momentum,
                volatility,
                signal: Signal::from_threshold(momentum, self.gate(volatility)),
            });
        }

        points
    }
}
