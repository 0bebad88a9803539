//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorName`: The fixed set of indicators a strategy can draw from
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values

pub mod ema;
pub mod rsi;
pub mod roc;
pub mod tsi;
pub mod stochastic;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::StratsearchError;

/// The indicators a strategy can be composed of, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorName {
    Rsi,
    Roc,
    Tsi,
    Stoch,
}

impl IndicatorName {
    pub const ALL: [IndicatorName; 4] = [
        IndicatorName::Rsi,
        IndicatorName::Roc,
        IndicatorName::Tsi,
        IndicatorName::Stoch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorName::Rsi => "rsi",
            IndicatorName::Roc => "roc",
            IndicatorName::Tsi => "tsi",
            IndicatorName::Stoch => "stoch",
        }
    }

    /// Position in [`IndicatorName::ALL`]; also the strategy bit.
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for IndicatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorName {
    type Err = StratsearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Ok(IndicatorName::Rsi),
            "roc" => Ok(IndicatorName::Roc),
            "tsi" => Ok(IndicatorName::Tsi),
            "stoch" | "stochastic" => Ok(IndicatorName::Stoch),
            other => Err(StratsearchError::InvalidParameter {
                name: "strategy".into(),
                reason: format!("unknown indicator '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub index: usize,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Stochastic { k: f64, d: f64 },
}

impl IndicatorValue {
    /// The value thresholds are compared against (%D for the stochastic).
    pub fn primary(&self) -> f64 {
        match self {
            IndicatorValue::Simple(v) => *v,
            IndicatorValue::Stochastic { d, .. } => *d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Roc(usize),
    Tsi { slow: usize, fast: usize },
    Stochastic { window: usize, smooth: usize },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Primary value at `i`, or `None` during warmup.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values
            .get(i)
            .filter(|p| p.valid)
            .map(|p| p.value.primary())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Tsi { slow, fast } => write!(f, "TSI({},{})", slow, fast),
            IndicatorType::Stochastic { window, smooth } => {
                write!(f, "STOCHASTIC({},{})", window, smooth)
            }
        }
    }
}

/// Reject windows that cannot produce output for a series of `len` bars.
pub(crate) fn check_window(
    indicator: &IndicatorType,
    window: usize,
    len: usize,
) -> Result<(), StratsearchError> {
    if window == 0 {
        return Err(StratsearchError::IndicatorComputation {
            indicator: indicator.to_string(),
            reason: "window must be at least 1".into(),
        });
    }
    if window > len {
        return Err(StratsearchError::IndicatorComputation {
            indicator: indicator.to_string(),
            reason: format!("window {} exceeds series length {}", window, len),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Roc(10).to_string(), "ROC(10)");
        assert_eq!(
            IndicatorType::Tsi { slow: 13, fast: 25 }.to_string(),
            "TSI(13,25)"
        );
        assert_eq!(
            IndicatorType::Stochastic {
                window: 14,
                smooth: 3
            }
            .to_string(),
            "STOCHASTIC(14,3)"
        );
    }

    #[test]
    fn name_round_trips_through_str() {
        for name in IndicatorName::ALL {
            assert_eq!(name.as_str().parse::<IndicatorName>().unwrap(), name);
        }
        assert_eq!(
            "Stochastic".parse::<IndicatorName>().unwrap(),
            IndicatorName::Stoch
        );
        assert!("macd".parse::<IndicatorName>().is_err());
    }

    #[test]
    fn canonical_order() {
        let mut shuffled = vec![
            IndicatorName::Stoch,
            IndicatorName::Rsi,
            IndicatorName::Tsi,
            IndicatorName::Roc,
        ];
        shuffled.sort();
        assert_eq!(shuffled, IndicatorName::ALL.to_vec());
        assert_eq!(IndicatorName::Tsi.ordinal(), 2);
    }

    #[test]
    fn check_window_bounds() {
        let t = IndicatorType::Rsi(0);
        assert!(check_window(&t, 0, 10).is_err());
        assert!(check_window(&t, 11, 10).is_err());
        assert!(check_window(&t, 10, 10).is_ok());
    }

    #[test]
    fn value_at_skips_warmup() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Roc(1),
            values: vec![
                IndicatorPoint {
                    index: 0,
                    valid: false,
                    value: IndicatorValue::Simple(0.0),
                },
                IndicatorPoint {
                    index: 1,
                    valid: true,
                    value: IndicatorValue::Stochastic { k: 10.0, d: 20.0 },
                },
            ],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(20.0));
        assert_eq!(series.value_at(2), None);
    }
}
