//! Composite strategy: fuses indicator signals into a target position.
//!
//! score = lwti_weight * polarity(trend) + vwap_weight * polarity(band),
//! forced to 0 in a High volatility regime. The target position is a step
//! function of the resulting signal, not proportional to the score.

use crate::domain::finite_or;
use crate::domain::indicator::regime::{RegimePoint, VolatilityRegime};
use crate::domain::indicator::trend_momentum::TrendMomentumPoint;
use crate::domain::indicator::vwap_band::VwapBandPoint;
use crate::domain::signal::Signal;

/// Scores within this distance of zero are Flat.
pub const SCORE_EPSILON: f64 = 1e-6;
pub const MAX_POSITION_LIMIT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeConfig {
    pub lwti_weight: f64,
    pub vwap_weight: f64,
    /// Target position as a fraction of equity.
    pub max_position: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            lwti_weight: 0.5,
            vwap_weight: 0.5,
            max_position: 1.0,
        }
    }
}

impl CompositeConfig {
    /// Non-finite values fall back to the defaults before range clamping.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            lwti_weight: finite_or(self.lwti_weight, defaults.lwti_weight).max(0.0),
            vwap_weight: finite_or(self.vwap_weight, defaults.vwap_weight).max(0.0),
            max_position: finite_or(self.max_position, defaults.max_position)
                .clamp(0.0, MAX_POSITION_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPoint {
    pub index: usize,
    pub timestamp: String,
    pub score: f64,
    pub position: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct CompositeStrategy {
    config: CompositeConfig,
}

impl CompositeStrategy {
    pub fn new(config: CompositeConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// One point per index present in all three inputs.
    pub fn generate(
        &self,
        trend: &[TrendMomentumPoint],
        bands: &[VwapBandPoint],
        regimes: &[RegimePoint],
    ) -> Vec<StrategyPoint> {
        trend
            .iter()
            .zip(bands)
            .zip(regimes)
            .enumerate()
            .map(|(i, ((t, b), r))| {
                let score = match r.regime {
                    VolatilityRegime::High => 0.0,
                    VolatilityRegime::Low => {
                        self.config.lwti_weight * f64::from(t.signal.polarity())
                            + self.config.vwap_weight * f64::from(b.signal.polarity())
                    }
                };
                let signal = Signal::from_threshold(score, SCORE_EPSILON);
                let position = f64::from(signal.polarity()) * self.config.max_position;

                StrategyPoint {
                    index: i,
                    timestamp: t.timestamp.clone(),
                    score,
                    position,
                    signal,
                }
            })
            .collect()
    }
}

impl Default for CompositeStrategy {
    fn default() -> Self {
        Self::new(CompositeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn trend(i: usize, signal: Signal) -> TrendMomentumPoint {
        TrendMomentumPoint {
            index: i,
            timestamp: format!("t{}", i + 1),
            smoothed: 0.0,
            momentum: 0.0,
            volatility: 0.0,
            signal,
        }
    }

    fn band(i: usize, signal: Signal) -> VwapBandPoint {
        VwapBandPoint {
            index: i,
            timestamp: format!("t{}", i + 1),
            vwap: 0.0,
            upper: 0.0,
            lower: 0.0,
            signal,
        }
    }

    fn regime(i: usize, regime: VolatilityRegime) -> RegimePoint {
        RegimePoint {
            index: i,
            timestamp: format!("t{}", i + 1),
            realized_vol: 0.0,
            regime,
            signal: match regime {
                VolatilityRegime::High => Signal::Flat,
                VolatilityRegime::Low => Signal::Long,
            },
        }
    }

    fn unit_strategy() -> CompositeStrategy {
        CompositeStrategy::new(CompositeConfig {
            lwti_weight: 1.0,
            vwap_weight: 1.0,
            max_position: 1.0,
        })
    }

    #[test]
    fn sanitizes_config() {
        let s = CompositeStrategy::new(CompositeConfig {
            lwti_weight: -1.0,
            vwap_weight: -2.0,
            max_position: 9.0,
        });
        assert_eq!(s.config().lwti_weight, 0.0);
        assert_eq!(s.config().vwap_weight, 0.0);
        assert_eq!(s.config().max_position, MAX_POSITION_LIMIT);

        let s = CompositeStrategy::new(CompositeConfig {
            max_position: -1.0,
            ..CompositeConfig::default()
        });
        assert_eq!(s.config().max_position, 0.0);
    }

    #[test]
    fn flattens_under_high_volatility() {
        let out = unit_strategy().generate(
            &[trend(0, Signal::Long), trend(1, Signal::Long)],
            &[band(0, Signal::Long), band(1, Signal::Long)],
            &[
                regime(0, VolatilityRegime::Low),
                regime(1, VolatilityRegime::High),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].signal, Signal::Long);
        assert!(out[0].position > 0.0);
        assert_eq!(out[1].score, 0.0);
        assert_eq!(out[1].signal, Signal::Flat);
        assert_eq!(out[1].position, 0.0);
    }

    #[test]
    fn opposing_signals_cancel() {
        let out = unit_strategy().generate(
            &[trend(0, Signal::Long)],
            &[band(0, Signal::Short)],
            &[regime(0, VolatilityRegime::Low)],
        );
        assert_abs_diff_eq!(out[0].score, 0.0);
        assert_eq!(out[0].signal, Signal::Flat);
        assert_eq!(out[0].position, 0.0);
    }

    #[test]
    fn position_is_step_function_of_signal() {
        let s = CompositeStrategy::new(CompositeConfig {
            lwti_weight: 0.7,
            vwap_weight: 0.2,
            max_position: 2.0,
        });
        let out = s.generate(
            &[trend(0, Signal::Short), trend(1, Signal::Flat)],
            &[band(0, Signal::Flat), band(1, Signal::Long)],
            &[
                regime(0, VolatilityRegime::Low),
                regime(1, VolatilityRegime::Low),
            ],
        );
        assert_abs_diff_eq!(out[0].score, -0.7);
        assert_eq!(out[0].signal, Signal::Short);
        assert_eq!(out[0].position, -2.0);
        assert_abs_diff_eq!(out[1].score, 0.2);
        assert_eq!(out[1].signal, Signal::Long);
        assert_eq!(out[1].position, 2.0);
    }

    #[test]
    fn zero_weights_never_trade() {
        let s = CompositeStrategy::new(CompositeConfig {
            lwti_weight: 0.0,
            vwap_weight: 0.0,
            max_position: 1.0,
        });
        let out = s.generate(
            &[trend(0, Signal::Long)],
            &[band(0, Signal::Long)],
            &[regime(0, VolatilityRegime::Low)],
        );
        assert_eq!(out[0].signal, Signal::Flat);
    }

    #[test]
    fn length_is_shortest_input() {
        let out = unit_strategy().generate(
            &[
                trend(0, Signal::Long),
                trend(1, Signal::Long),
                trend(2, Signal::Long),
            ],
            &[band(0, Signal::Flat), band(1, Signal::Flat)],
            &[
                regime(0, VolatilityRegime::Low),
                regime(1, VolatilityRegime::Low),
                regime(2, VolatilityRegime::Low),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].index, 1);
        assert_eq!(out[1].timestamp, "t2");
    }

    #[test]
    fn empty_inputs() {
        assert!(unit_strategy().generate(&[], &[], &[]).is_empty());
    }

    #[test]
    fn non_finite_config_falls_back_to_defaults() {
        let strategy = CompositeStrategy::new(CompositeConfig {
            lwti_weight: f64::INFINITY,
            vwap_weight: f64::NEG_INFINITY,
            max_position: f64::NAN,
        });
        assert_eq!(strategy.config(), &CompositeConfig::default());

        let points = strategy.generate(
            &[trend(0, Signal::Long), trend(1, Signal::Long)],
            &[band(0, Signal::Long), band(1, Signal::Long)],
            &[regime(0, VolatilityRegime::Low), regime(1, VolatilityRegime::High)],
        );
        assert_eq!(points[0].position, 1.0);
        assert_eq!(points[1].position, 0.0);
        assert_eq!(points[1].signal, Signal::Flat);
    }
}
