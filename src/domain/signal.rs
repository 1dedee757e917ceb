//! Directional signal shared by indicators, the composite scorer and reports.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown signal '{0}' (expected long, short or flat)")]
pub struct ParseSignalError(pub String);

impl Signal {
    /// +1 for Long, -1 for Short, 0 for Flat.
    pub fn polarity(self) -> i32 {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Long => "long",
            Signal::Short => "short",
            Signal::Flat => "flat",
        }
    }

    /// Long when `value > band`, Short when `value < -band`, otherwise Flat.
    pub fn from_threshold(value: f64, band: f64) -> Self {
        if value > band {
            Signal::Long
        } else if value < -band {
            Signal::Short
        } else {
            Signal::Flat
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Signal::Long),
            "short" => Ok(Signal::Short),
            "flat" => Ok(Signal::Flat),
            _ => Err(ParseSignalError(s.to_string())),
        }
    }
}
