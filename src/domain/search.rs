//! Exhaustive strategy search over the indicator powerset.
//!
//! Every non-empty indicator subset gets its own optimizer run with a fresh
//! oracle. Subsets may run in parallel, but results are folded in
//! enumeration order, so the outcome does not depend on scheduling.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::error::StratsearchError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::optimizer::{ParameterOptimizer, Study, TrialResult};
use crate::domain::params::ParameterVector;
use crate::domain::strategy::{Strategy, powerset};
use crate::ports::oracle_port::OracleFactory;

/// Initial value of the best tracker; any completed trial beats it.
const BEST_SENTINEL: f64 = -1.0;

/// Outcome of one subset's optimizer run.
#[derive(Debug, Clone)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub best: Option<TrialResult>,
    pub completed: usize,
    pub failed: usize,
}

impl StrategySummary {
    fn from_study(study: &Study) -> Self {
        StrategySummary {
            strategy: study.strategy(),
            best: study.best(),
            completed: study.completed_count(),
            failed: study.failed_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub strategy: Strategy,
    pub params: ParameterVector,
    pub value: f64,
    /// One entry per subset, in enumeration order.
    pub summaries: Vec<StrategySummary>,
    /// Best value seen after each subset was folded in.
    pub best_history: Vec<f64>,
}

/// Search outcome for one input file.
#[derive(Debug)]
pub struct FileReport {
    pub file: String,
    pub outcome: Result<SearchResult, StratsearchError>,
}

pub struct StrategySearch {
    optimizer: ParameterOptimizer,
    factory: Box<dyn OracleFactory>,
    parallel: bool,
}

impl StrategySearch {
    pub fn new(optimizer: ParameterOptimizer, factory: Box<dyn OracleFactory>) -> Self {
        StrategySearch {
            optimizer,
            factory,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn search(&self, series: &PriceSeries) -> Result<SearchResult, StratsearchError> {
        if series.is_empty() {
            return Err(StratsearchError::EmptySeries {
                source_name: series.source().to_string(),
            });
        }

        let subsets = powerset();
        let studies: Vec<Result<Study, StratsearchError>> = if self.parallel {
            subsets.par_iter().map(|s| self.run_subset(s, series)).collect()
        } else {
            subsets.iter().map(|s| self.run_subset(s, series)).collect()
        };

        let mut best_value = BEST_SENTINEL;
        let mut best: Option<(Strategy, ParameterVector)> = None;
        let mut summaries = Vec::with_capacity(subsets.len());
        let mut best_history = Vec::with_capacity(subsets.len());

        for study in studies {
            let summary = StrategySummary::from_study(&study?);
            match &summary.best {
                None => warn!(
                    strategy = %summary.strategy,
                    failed = summary.failed,
                    "no completed trial, skipping strategy"
                ),
                Some(result) => {
                    info!(
                        strategy = %summary.strategy,
                        value = result.final_cash,
                        completed = summary.completed,
                        failed = summary.failed,
                        "strategy optimized"
                    );
                    if result.final_cash > best_value {
                        best_value = result.final_cash;
                        best = Some((summary.strategy, result.params.clone()));
                        info!(strategy = %summary.strategy, value = best_value, "new best");
                    }
                }
            }
            best_history.push(best_value);
            summaries.push(summary);
        }

        let (strategy, params) = best.ok_or(StratsearchError::NoViableStrategy)?;
        Ok(SearchResult {
            strategy,
            params,
            value: best_value,
            summaries,
            best_history,
        })
    }

    fn run_subset(
        &self,
        strategy: &Strategy,
        series: &PriceSeries,
    ) -> Result<Study, StratsearchError> {
        let mut oracle = self.factory.build(strategy);
        self.optimizer.optimize(strategy, series, &mut *oracle)
    }
}
