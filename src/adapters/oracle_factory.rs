//! Seeded oracle construction, one independent oracle per strategy.

use std::fmt;
use std::str::FromStr;

use crate::adapters::gaussian_oracle::{GaussianConfig, GaussianTopKOracle};
use crate::adapters::random_oracle::RandomOracle;
use crate::domain::error::StratsearchError;
use crate::domain::strategy::Strategy;
use crate::ports::oracle_port::{OracleFactory, SearchOracle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OracleKind {
    Random,
    Gaussian(GaussianConfig),
}

impl OracleKind {
    pub fn name(&self) -> &'static str {
        match self {
            OracleKind::Random => "random",
            OracleKind::Gaussian(_) => "gaussian",
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OracleKind {
    type Err = StratsearchError;

    /// Parses the oracle name; the Gaussian variant starts from default knobs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(OracleKind::Random),
            "gaussian" => Ok(OracleKind::Gaussian(GaussianConfig::default())),
            other => Err(StratsearchError::ConfigInvalid {
                section: "search".into(),
                key: "oracle".into(),
                reason: format!("unknown oracle '{}', expected gaussian or random", other),
            }),
        }
    }
}

/// Builds oracles whose seed mixes the base seed with the strategy bits, so
/// each subset draws from its own stream regardless of scheduling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeededOracleFactory {
    pub kind: OracleKind,
    pub seed: u64,
}

impl SeededOracleFactory {
    pub fn new(kind: OracleKind, seed: u64) -> Self {
        SeededOracleFactory { kind, seed }
    }

    pub fn seed_for(&self, strategy: &Strategy) -> u64 {
        self.seed ^ u64::from(strategy.bits()).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

impl OracleFactory for SeededOracleFactory {
    fn build(&self, strategy: &Strategy) -> Box<dyn SearchOracle + Send> {
        let seed = self.seed_for(strategy);
        match self.kind {
            OracleKind::Random => Box::new(RandomOracle::new(seed)),
            OracleKind::Gaussian(config) => Box::new(GaussianTopKOracle::new(seed, config)),
        }
    }
}
