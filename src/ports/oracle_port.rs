//! Search oracle port: the sampler that proposes trial parameters.

use crate::domain::optimizer::TrialOutcome;
use crate::domain::strategy::Strategy;

/// Sequential ask/suggest/tell sampler.
///
/// One trial is `ask`, then one `suggest_*` call per parameter in a fixed
/// order, then `tell`. Suggested values must lie in `[low, high]`.
pub trait SearchOracle {
    /// Start a new trial and return its number, counting from 0.
    fn ask(&mut self) -> usize;
    fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> i64;
    fn suggest_float(&mut self, name: &str, low: f64, high: f64) -> f64;
    /// Report how the current trial ended.
    fn tell(&mut self, outcome: &TrialOutcome);
}

/// Builds a fresh, independent oracle for each strategy subset.
pub trait OracleFactory: Send + Sync {
    fn build(&self, strategy: &Strategy) -> Box<dyn SearchOracle + Send>;
}
