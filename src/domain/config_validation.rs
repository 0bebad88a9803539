//! Configuration validation.
//!
//! Checks every `[search]` knob before any file is loaded, and decodes the
//! explicit strategy and parameters of the `[evaluate]` section.

use std::str::FromStr;

use crate::domain::error::StratsearchError;
use crate::domain::params::{ParamDomain, ParamValue, ParameterVector, specs_for};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;

pub const SEARCH: &str = "search";
pub const EVALUATE: &str = "evaluate";

const ORACLES: [&str; 2] = ["gaussian", "random"];

pub fn validate_search_config(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    validate_trials(config)?;
    validate_commission_rate(config)?;
    validate_initial_cash(config)?;
    validate_seed(config)?;
    validate_oracle(config)?;
    validate_sampler(config)?;
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> StratsearchError {
    StratsearchError::ConfigInvalid {
        section: SEARCH.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// The parsed value of `[search] key`, `None` if absent. A present value
/// that does not parse is an error rather than a silent default.
fn parsed<T: FromStr>(config: &dyn ConfigPort, key: &str) -> Result<Option<T>, StratsearchError> {
    match config.get_string(SEARCH, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(key, format!("cannot parse '{}'", raw.trim()))),
    }
}

fn validate_trials(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    if let Some(trials) = parsed::<i64>(config, "trials")? {
        if trials <= 0 {
            return Err(invalid("trials", "trials must be at least 1"));
        }
    }
    Ok(())
}

fn validate_commission_rate(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    if let Some(rate) = parsed::<f64>(config, "commission_rate")? {
        if !(0.0..1.0).contains(&rate) {
            return Err(invalid(
                "commission_rate",
                "commission_rate must be in [0, 1)",
            ));
        }
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    if let Some(cash) = parsed::<f64>(config, "initial_cash")? {
        if !(cash.is_finite() && cash > 0.0) {
            return Err(invalid("initial_cash", "initial_cash must be positive"));
        }
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    parsed::<u64>(config, "seed").map(|_| ())
}

fn validate_oracle(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    if let Some(name) = config.get_string(SEARCH, "oracle") {
        let name = name.trim().to_ascii_lowercase();
        if !ORACLES.contains(&name.as_str()) {
            return Err(invalid(
                "oracle",
                format!("unknown oracle '{}', expected gaussian or random", name),
            ));
        }
    }
    Ok(())
}

fn validate_sampler(config: &dyn ConfigPort) -> Result<(), StratsearchError> {
    parsed::<usize>(config, "startup_trials")?;

    if let Some(ratio) = parsed::<f64>(config, "explore_ratio")? {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(invalid("explore_ratio", "explore_ratio must be in [0, 1]"));
        }
    }

    if let Some(top_k) = parsed::<i64>(config, "top_k")? {
        if top_k < 1 {
            return Err(invalid("top_k", "top_k must be at least 1"));
        }
    }

    if let Some(sigma) = parsed::<f64>(config, "sigma_ratio")? {
        if !(sigma > 0.0 && sigma <= 1.0) {
            return Err(invalid("sigma_ratio", "sigma_ratio must be in (0, 1]"));
        }
    }
    Ok(())
}

/// Read the `[evaluate]` strategy and its full parameter vector.
///
/// Integer parameters must be written as integers; values are checked
/// against their domains.
pub fn evaluate_params(
    config: &dyn ConfigPort,
) -> Result<(Strategy, ParameterVector), StratsearchError> {
    let raw = config
        .get_string(EVALUATE, "strategy")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| StratsearchError::ConfigMissing {
            section: EVALUATE.to_string(),
            key: "strategy".to_string(),
        })?;
    let strategy: Strategy = raw.parse().map_err(|e: StratsearchError| {
        StratsearchError::ConfigInvalid {
            section: EVALUATE.to_string(),
            key: "strategy".to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut params = ParameterVector::new();
    for spec in specs_for(&strategy) {
        let raw = config
            .get_string(EVALUATE, spec.name)
            .ok_or_else(|| StratsearchError::ConfigMissing {
                section: EVALUATE.to_string(),
                key: spec.name.to_string(),
            })?;
        let raw = raw.trim();
        let value = match spec.domain {
            ParamDomain::Int { .. } => raw.parse::<i64>().ok().map(ParamValue::Int),
            ParamDomain::Float { .. } => raw.parse::<f64>().ok().map(ParamValue::Float),
        };
        let value = value.ok_or_else(|| StratsearchError::ConfigInvalid {
            section: EVALUATE.to_string(),
            key: spec.name.to_string(),
            reason: format!("cannot parse '{}' as {}", raw, spec.domain),
        })?;
        params.insert(spec.name, value);
    }

    params.validate(&strategy)?;
    Ok((strategy, params))
}
