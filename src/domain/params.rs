//! Parameter domains, parameter vectors and their typed decodings.
//!
//! Every tunable value is declared once in a static [`ParamSpec`] table.
//! Trade-wide parameters come first; each indicator owns its own namespace.
//! A [`ParameterVector`] is only turned into typed parameters after every
//! value has been checked against its domain.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::StratsearchError;
use crate::domain::indicator::IndicatorName;
use crate::domain::strategy::Strategy;

/// Inclusive domain of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDomain {
    Int { low: i64, high: i64 },
    Float { low: f64, high: f64 },
}

impl ParamDomain {
    pub fn contains(&self, value: ParamValue) -> bool {
        match (self, value) {
            (ParamDomain::Int { low, high }, ParamValue::Int(v)) => (*low..=*high).contains(&v),
            (ParamDomain::Float { low, high }, ParamValue::Float(v)) => {
                v.is_finite() && *low <= v && v <= *high
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDomain::Int { low, high } => write!(f, "int [{}, {}]", low, high),
            ParamDomain::Float { low, high } => write!(f, "float [{}, {}]", low, high),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub domain: ParamDomain,
}

const fn int(name: &'static str, low: i64, high: i64) -> ParamSpec {
    ParamSpec {
        name,
        domain: ParamDomain::Int { low, high },
    }
}

const fn float(name: &'static str, low: f64, high: f64) -> ParamSpec {
    ParamSpec {
        name,
        domain: ParamDomain::Float { low, high },
    }
}

pub const TRADE_PARAMS: [ParamSpec; 3] = [
    int("n_shares", 5, 200),
    float("stop_loss", 0.0025, 0.05),
    float("take_profit", 0.0025, 0.05),
];

const RSI_PARAMS: [ParamSpec; 3] = [
    int("rsi_window", 5, 100),
    float("rsi_upper", 65.0, 95.0),
    float("rsi_lower", 5.0, 35.0),
];

const ROC_PARAMS: [ParamSpec; 3] = [
    int("roc_window", 5, 100),
    float("roc_upper", 0.8, 1.5),
    float("roc_lower", -2.0, -1.0),
];

const TSI_PARAMS: [ParamSpec; 4] = [
    int("tsi_window_slow", 5, 20),
    int("tsi_window_fast", 20, 40),
    float("tsi_upper", 25.0, 45.0),
    float("tsi_lower", -40.0, -20.0),
];

const STOCH_PARAMS: [ParamSpec; 4] = [
    int("stoch_window", 5, 21),
    int("stoch_smooth_window", 3, 10),
    float("stoch_upper", 70.0, 90.0),
    float("stoch_lower", 10.0, 30.0),
];

impl IndicatorName {
    /// The statically declared parameter namespace of this indicator.
    pub fn param_specs(self) -> &'static [ParamSpec] {
        match self {
            IndicatorName::Rsi => &RSI_PARAMS,
            IndicatorName::Roc => &ROC_PARAMS,
            IndicatorName::Tsi => &TSI_PARAMS,
            IndicatorName::Stoch => &STOCH_PARAMS,
        }
    }
}

/// All specs a strategy's parameter vector must cover, in suggestion order.
pub fn specs_for(strategy: &Strategy) -> Vec<ParamSpec> {
    TRADE_PARAMS
        .iter()
        .chain(strategy.indicators().flat_map(|name| name.param_specs()))
        .copied()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Parameter name to value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterVector(BTreeMap<String, ParamValue>);

impl ParameterVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check every value the strategy needs against its declared domain.
    /// Values are rejected, never clamped.
    pub fn validate(&self, strategy: &Strategy) -> Result<(), StratsearchError> {
        for spec in specs_for(strategy) {
            let value = self
                .get(spec.name)
                .ok_or_else(|| StratsearchError::InvalidParameter {
                    name: spec.name.to_string(),
                    reason: "missing".into(),
                })?;
            if !spec.domain.contains(value) {
                return Err(StratsearchError::InvalidParameter {
                    name: spec.name.to_string(),
                    reason: format!("{} outside {}", value, spec.domain),
                });
            }
        }
        Ok(())
    }

    fn int(&self, name: &str) -> Result<i64, StratsearchError> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Ok(v),
            Some(other) => Err(StratsearchError::InvalidParameter {
                name: name.into(),
                reason: format!("expected an integer, got {}", other),
            }),
            None => Err(StratsearchError::InvalidParameter {
                name: name.into(),
                reason: "missing".into(),
            }),
        }
    }

    fn window(&self, name: &str) -> Result<usize, StratsearchError> {
        let v = self.int(name)?;
        usize::try_from(v).map_err(|_| StratsearchError::InvalidParameter {
            name: name.into(),
            reason: format!("window {} is negative", v),
        })
    }

    fn float(&self, name: &str) -> Result<f64, StratsearchError> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Ok(v),
            Some(ParamValue::Int(v)) => Ok(v as f64),
            None => Err(StratsearchError::InvalidParameter {
                name: name.into(),
                reason: "missing".into(),
            }),
        }
    }
}

/// Strategy-wide position sizing and exit thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParams {
    pub n_shares: u32,
    /// Fractional distance below entry that forces a close.
    pub stop_loss: f64,
    /// Fractional distance above entry that forces a close.
    pub take_profit: f64,
}

impl TradeParams {
    pub fn from_vector(params: &ParameterVector) -> Result<Self, StratsearchError> {
        let n_shares = params.int("n_shares")?;
        let n_shares = u32::try_from(n_shares).map_err(|_| StratsearchError::InvalidParameter {
            name: "n_shares".into(),
            reason: format!("{} is not a share count", n_shares),
        })?;
        Ok(TradeParams {
            n_shares,
            stop_loss: params.float("stop_loss")?,
            take_profit: params.float("take_profit")?,
        })
    }
}

/// Typed parameters of one indicator, tagged by indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorParams {
    Rsi {
        window: usize,
        upper: f64,
        lower: f64,
    },
    Roc {
        window: usize,
        upper: f64,
        lower: f64,
    },
    Tsi {
        window_slow: usize,
        window_fast: usize,
        upper: f64,
        lower: f64,
    },
    Stoch {
        window: usize,
        smooth_window: usize,
        upper: f64,
        lower: f64,
    },
}

impl IndicatorParams {
    pub fn from_vector(
        name: IndicatorName,
        params: &ParameterVector,
    ) -> Result<Self, StratsearchError> {
        Ok(match name {
            IndicatorName::Rsi => IndicatorParams::Rsi {
                window: params.window("rsi_window")?,
                upper: params.float("rsi_upper")?,
                lower: params.float("rsi_lower")?,
            },
            IndicatorName::Roc => IndicatorParams::Roc {
                window: params.window("roc_window")?,
                upper: params.float("roc_upper")?,
                lower: params.float("roc_lower")?,
            },
            IndicatorName::Tsi => IndicatorParams::Tsi {
                window_slow: params.window("tsi_window_slow")?,
                window_fast: params.window("tsi_window_fast")?,
                upper: params.float("tsi_upper")?,
                lower: params.float("tsi_lower")?,
            },
            IndicatorName::Stoch => IndicatorParams::Stoch {
                window: params.window("stoch_window")?,
                smooth_window: params.window("stoch_smooth_window")?,
                upper: params.float("stoch_upper")?,
                lower: params.float("stoch_lower")?,
            },
        })
    }

    pub fn name(&self) -> IndicatorName {
        match self {
            IndicatorParams::Rsi { .. } => IndicatorName::Rsi,
            IndicatorParams::Roc { .. } => IndicatorName::Roc,
            IndicatorParams::Tsi { .. } => IndicatorName::Tsi,
            IndicatorParams::Stoch { .. } => IndicatorName::Stoch,
        }
    }

    /// (lower, upper) signal thresholds.
    pub fn thresholds(&self) -> (f64, f64) {
        match *self {
            IndicatorParams::Rsi { lower, upper, .. }
            | IndicatorParams::Roc { lower, upper, .. }
            | IndicatorParams::Tsi { lower, upper, .. }
            | IndicatorParams::Stoch { lower, upper, .. } => (lower, upper),
        }
    }
}
