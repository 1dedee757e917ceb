//! Realized-volatility regime classifier.
//!
//! Close-to-close simple returns feed a rolling window; the population
//! stddev of that window is the realized volatility. Bars above
//! `high_vol_threshold` are High regime (risk-off, Flat), everything else is
//! Low regime with a neutral Long bias. The signal is informative only; the
//! composite scorer decides positioning.

use std::fmt;

use crate::domain::finite_or;
use crate::domain::indicator::{Indicator, simple_return};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rolling_window::RollingWindow;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VolatilityRegime {
    #[default]
    Low,
    High,
}

impl VolatilityRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            VolatilityRegime::Low => "low",
            VolatilityRegime::High => "high",
        }
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimeConfig {
    pub window: usize,
    /// Per-bar return stddev above which the regime is High.
    pub high_vol_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            window: 30,
            high_vol_threshold: 0.02,
        }
    }
}

impl RegimeConfig {
    pub fn sanitized(self) -> Self {
        Self {
            window: self.window.max(1),
            high_vol_threshold: finite_or(
                self.high_vol_threshold,
                Self::default().high_vol_threshold,
            )
            .max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimePoint {
    pub index: usize,
    pub timestamp: String,
    pub realized_vol: f64,
    pub regime: VolatilityRegime,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct RegimeIndicator {
    config: RegimeConfig,
}

impl RegimeIndicator {
    pub fn new(config: RegimeConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }
}

impl Default for RegimeIndicator {
    fn default() -> Self {
        Self::new(RegimeConfig::default())
    }
}

impl Indicator for RegimeIndicator {
    type Point = RegimePoint;

    fn compute(&self, bars: &[OhlcvBar]) -> Vec<RegimePoint> {
        let mut returns = RollingWindow::new(self.config.window);
        let mut prev_close: Option<f64> = None;

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if let Some(prev) = prev_close {
                    returns.push(simple_return(bar.close, prev));
                }
                prev_close = Some(bar.close);

                let realized_vol = returns.stddev();
                let regime = if realized_vol > self.config.high_vol_threshold {
                    VolatilityRegime::High
                } else {
                    VolatilityRegime::Low
                };
                let signal = match regime {
                    VolatilityRegime::High => Signal::Flat,
                    VolatilityRegime::Low => Signal::Long,
                };

                RegimePoint {
                    index: i,
                    timestamp: bar.timestamp.clone(),
                    realized_vol,
                    regime,
                    signal,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvBar::new(format!("t{}", i + 1), c, c, c, c, 100.0))
            .collect()
    }

    #[test]
    fn empty_bars() {
        assert!(RegimeIndicator::default().compute(&[]).is_empty());
    }

    #[test]
    fn sanitizes_config() {
        let ind = RegimeIndicator::new(RegimeConfig {
            window: 0,
            high_vol_threshold: -0.5,
        });
        assert_eq!(ind.config().window, 1);
        assert_eq!(ind.config().high_vol_threshold, 0.0);
    }

    #[test]
    fn first_bar_has_no_return() {
        let points = RegimeIndicator::default().compute(&make_bars(&[100.0]));
        assert_eq!(points[0].realized_vol, 0.0);
        assert_eq!(points[0].regime, VolatilityRegime::Low);
        assert_eq!(points[0].signal, Signal::Long);
    }

    #[test]
    fn calm_series_is_low_regime() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
        let points = RegimeIndicator::default().compute(&make_bars(&closes));
        assert!(points.iter().all(|p| p.regime == VolatilityRegime::Low));
        assert!(points.iter().all(|p| p.signal == Signal::Long));
    }

    #[test]
    fn choppy_series_is_high_regime() {
        let bars = make_bars(&[100.0, 110.0, 99.0, 110.0, 99.0]);
        let points = RegimeIndicator::new(RegimeConfig {
            window: 4,
            high_vol_threshold: 0.05,
        })
        .compute(&bars);
        let last = points.last().unwrap();
        assert!(last.realized_vol > 0.05);
        assert_eq!(last.regime, VolatilityRegime::High);
        assert_eq!(last.signal, Signal::Flat);
    }

    #[test]
    fn realized_vol_matches_population_stddev() {
        let points = RegimeIndicator::new(RegimeConfig {
            window: 2,
            high_vol_threshold: 1.0,
        })
        .compute(&make_bars(&[100.0, 110.0, 99.0]));
        assert_abs_diff_eq!(points[2].realized_vol, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn zero_close_does_not_blow_up() {
        let points = RegimeIndicator::default().compute(&make_bars(&[0.0, 10.0, 10.0]));
        assert!(points.iter().all(|p| p.realized_vol.is_finite()));
    }

    #[test]
    fn regime_display() {
        assert_eq!(VolatilityRegime::Low.to_string(), "low");
        assert_eq!(VolatilityRegime::High.to_string(), "high");
    }

    #[test]
    fn oversized_window_computes() {
        let bars = make_bars(&[100.0, 101.0, 99.0]);
        for window in [1 << 40, usize::MAX] {
            let points = RegimeIndicator::new(RegimeConfig {
                window,
                high_vol_threshold: 0.02,
            })
            .compute(&bars);
            assert_eq!(points.len(), 3);
        }
    }

    #[test]
    fn non_finite_threshold_falls_back_to_default() {
        let ind = RegimeIndicator::new(RegimeConfig {
            window: 5,
            high_vol_threshold: f64::NAN,
        });
        assert_eq!(ind.config().high_vol_threshold, 0.02);
    }
}
