//! Core domain types and logic.

pub mod ohlcv;
pub mod signal;
pub mod rolling_window;
pub mod indicator;
pub mod composite;
pub mod backtest;
pub mod pipeline;
pub mod config_validation;
pub mod error;

/// `value` when finite, otherwise `fallback`.
pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
