//! Rolling VWAP band indicator.
//!
//! Middle: VWAP over the window (close when the window has no volume)
//! Upper/Lower: VWAP ± deviation × population stddev of closes in the window
//!
//! A close below the lower band is a mean-reversion Long, a close above the
//! upper band is a Short.

use crate::domain::finite_or;
use crate::domain::indicator::Indicator;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rolling_window::RollingWindow;
use crate::domain::signal::Signal;

pub const MIN_BAND_DEVIATION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct VwapBandConfig {
    pub window: usize,
    pub band_deviation: f64,
}

impl Default for VwapBandConfig {
    fn default() -> Self {
        Self {
            window: 20,
            band_deviation: 1.5,
        }
    }
}

impl VwapBandConfig {
    pub fn sanitized(self) -> Self {
        Self {
            window: self.window.max(1),
            band_deviation: finite_or(self.band_deviation, Self::default().band_deviation)
                .max(MIN_BAND_DEVIATION),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VwapBandPoint {
    pub index: usize,
    pub timestamp: String,
    pub vwap: f64,
    pub upper: f64,
    pub lower: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct VwapBandIndicator {
    config: VwapBandConfig,
}

impl VwapBandIndicator {
    pub fn new(config: VwapBandConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &VwapBandConfig {
        &self.config
    }
}

impl Default for VwapBandIndicator {
    fn default() -> Self {
        Self::new(VwapBandConfig::default())
    }
}

impl Indicator for VwapBandIndicator {
    type Point = VwapBandPoint;

    fn compute(&self, bars: &[OhlcvBar]) -> Vec<VwapBandPoint> {
        let window = self.config.window;
        let mut price_volume = RollingWindow::new(window);
        let mut volume = RollingWindow::new(window);
        let mut prices = RollingWindow::new(window);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let price = bar.close;
                price_volume.push(price * bar.volume);
                volume.push(bar.volume);
                prices.push(price);

                let vwap = if volume.sum() > 0.0 {
                    price_volume.sum() / volume.sum()
                } else {
                    price
                };
                let offset = prices.stddev() * self.config.band_deviation;
                let upper = vwap + offset;
                let lower = vwap - offset;

                let signal = if price < lower {
                    Signal::Long
                } else if price > upper {
                    Signal::Short
                } else {
                    Signal::Flat
                };

                VwapBandPoint {
                    index: i,
                    timestamp: bar.timestamp.clone(),
                    vwap,
                    upper,
                    lower,
                    signal,
                }
            })
            .collect()
    }
}
