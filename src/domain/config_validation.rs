//! Configuration validation.
//!
//! Every key is optional. A key that is present must parse as its expected
//! type; out-of-range values are not errors here because each component
//! sanitizes its own configuration when constructed.

use crate::domain::error::LwtrendError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Integer,
    Float,
}

const NUMERIC_KEYS: &[(&str, &str, KeyKind)] = &[
    ("lwti", "trend_period", KeyKind::Integer),
    ("lwti", "momentum_lookback", KeyKind::Integer),
    ("lwti", "volatility_window", KeyKind::Integer),
    ("lwti", "threshold", KeyKind::Float),
    ("lwti", "volume_floor", KeyKind::Float),
    ("vwap", "window", KeyKind::Integer),
    ("vwap", "band_deviation", KeyKind::Float),
    ("regime", "window", KeyKind::Integer),
    ("regime", "high_vol_threshold", KeyKind::Float),
    ("strategy", "lwti_weight", KeyKind::Float),
    ("strategy", "vwap_weight", KeyKind::Float),
    ("strategy", "max_position", KeyKind::Float),
    ("backtest", "starting_equity", KeyKind::Float),
    ("backtest", "risk_per_trade", KeyKind::Float),
    ("backtest", "fee_bps", KeyKind::Float),
    ("backtest", "slippage_bps", KeyKind::Float),
];

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), LwtrendError> {
    for &(section, key, kind) in NUMERIC_KEYS {
        validate_numeric(config, section, key, kind)?;
    }
    validate_input_path(config)?;
    Ok(())
}

fn validate_numeric(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    kind: KeyKind,
) -> Result<(), LwtrendError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    let raw = raw.trim();
    let reason = match kind {
        KeyKind::Integer if raw.parse::<i64>().is_err() => "expected an integer",
        KeyKind::Float => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => return Ok(()),
            Ok(_) => "expected a finite number",
            Err(_) => "expected a number",
        },
        KeyKind::Integer => return Ok(()),
    };
    Err(LwtrendError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{reason}, got '{raw}'"),
    })
}

fn validate_input_path(config: &dyn ConfigPort) -> Result<(), LwtrendError> {
    match config.get_string("data", "input_path") {
        Some(s) if s.trim().is_empty() => Err(LwtrendError::ConfigInvalid {
            section: "data".to_string(),
            key: "input_path".to_string(),
            reason: "input_path must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}
