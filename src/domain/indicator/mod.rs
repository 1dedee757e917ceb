//! Technical indicator implementations.
//!
//! Each indicator is constructed once from a configuration value (sanitized
//! at construction) and then maps a bar slice to one point per bar:
//! - [`trend_momentum`]: liquidity-weighted smoothing with a volatility-gated momentum signal
//! - [`vwap_band`]: rolling VWAP with standard-deviation bands
//! - [`regime`]: realized-volatility regime classifier

pub mod regime;
pub mod trend_momentum;
pub mod vwap_band;

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::Signal;

/// Guard for relative-change denominators.
pub const DENOMINATOR_EPSILON: f64 = 1e-9;

/// A per-bar computation over a whole bar series.
///
/// Output has the same length and order as `bars`, and the point at position
/// `i` carries `bars[i].timestamp`.
pub trait Indicator {
    type Point;

    fn compute(&self, bars: &[OhlcvBar]) -> Vec<Self::Point>;
}

/// Common view over every point type that carries a signal.
pub trait SignalPoint {
    fn index(&self) -> usize;
    fn timestamp(&self) -> &str;
    fn signal(&self) -> Signal;
}

/// Simple return `(current - previous) / previous`, or 0 when `previous`
/// is too close to zero.
pub(crate) fn simple_return(current: f64, previous: f64) -> f64 {
    if previous.abs() > DENOMINATOR_EPSILON {
        (current - previous) / previous
    } else {
        0.0
    }
}

macro_rules! impl_signal_point {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SignalPoint for $ty {
                fn index(&self) -> usize {
                    self.index
                }

                fn timestamp(&self) -> &str {
                    &self.timestamp
                }

                fn signal(&self) -> Signal {
                    self.signal
                }
            }
        )+
    };
}

impl_signal_point!(
    trend_momentum::TrendMomentumPoint,
    vwap_band::VwapBandPoint,
    regime::RegimePoint,
    crate::domain::composite::StrategyPoint,
);
