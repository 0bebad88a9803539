//! Per-strategy parameter optimization.
//!
//! A [`ParameterOptimizer`] runs a fixed budget of trials against one
//! strategy. Each trial draws a full parameter vector from the oracle,
//! builds the signal matrix and scores it by final cash. Trials whose
//! parameters turn out unusable are recorded as failed and the run goes on.

use tracing::{debug, warn};

use crate::domain::backtest::{BacktestConfig, final_cash};
use crate::domain::error::StratsearchError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::params::{ParamDomain, ParamValue, ParameterVector, TradeParams, specs_for};
use crate::domain::signal;
use crate::domain::strategy::Strategy;
use crate::ports::oracle_port::SearchOracle;

pub const DEFAULT_TRIALS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Completed(f64),
    Failed(String),
}

impl TrialOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            TrialOutcome::Completed(v) => Some(*v),
            TrialOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub number: usize,
    pub params: ParameterVector,
    pub outcome: TrialOutcome,
}

/// The best completed trial of a study.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub params: ParameterVector,
    pub final_cash: f64,
}

/// Every trial run for one strategy, in execution order.
#[derive(Debug, Clone)]
pub struct Study {
    strategy: Strategy,
    trials: Vec<Trial>,
}

impl Study {
    pub fn new(strategy: Strategy) -> Self {
        Study {
            strategy,
            trials: Vec::new(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn push(&mut self, trial: Trial) {
        self.trials.push(trial);
    }

    /// Highest final cash over completed trials; the earliest trial wins ties.
    pub fn best(&self) -> Option<TrialResult> {
        let mut best: Option<(&Trial, f64)> = None;
        for trial in &self.trials {
            if let Some(v) = trial.outcome.value() {
                match best {
                    Some((_, b)) if v <= b => {}
                    _ => best = Some((trial, v)),
                }
            }
        }
        best.map(|(trial, v)| TrialResult {
            params: trial.params.clone(),
            final_cash: v,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| matches!(t.outcome, TrialOutcome::Completed(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.trials.len() - self.completed_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    pub trials: usize,
    pub backtest: BacktestConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            trials: DEFAULT_TRIALS,
            backtest: BacktestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterOptimizer {
    config: OptimizerConfig,
}

impl ParameterOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        ParameterOptimizer { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run the full trial budget for `strategy`.
    ///
    /// Only errors that are not local to a trial abort the run. A study in
    /// which every trial failed is still returned; its `best()` is `None`.
    pub fn optimize(
        &self,
        strategy: &Strategy,
        series: &PriceSeries,
        oracle: &mut dyn SearchOracle,
    ) -> Result<Study, StratsearchError> {
        let mut study = Study::new(*strategy);

        for _ in 0..self.config.trials {
            let number = oracle.ask();
            let params = suggest_vector(strategy, oracle);

            let outcome = match self.evaluate(strategy, series, &params) {
                Ok(value) => {
                    debug!(%strategy, trial = number, value, "trial completed");
                    TrialOutcome::Completed(value)
                }
                Err(e) if e.is_trial_local() => {
                    warn!(%strategy, trial = number, error = %e, "trial failed");
                    TrialOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    oracle.tell(&TrialOutcome::Failed(e.to_string()));
                    return Err(e);
                }
            };

            oracle.tell(&outcome);
            study.push(Trial {
                number,
                params,
                outcome,
            });
        }

        Ok(study)
    }

    /// Score one parameter vector: final cash of a single simulation.
    pub fn evaluate(
        &self,
        strategy: &Strategy,
        series: &PriceSeries,
        params: &ParameterVector,
    ) -> Result<f64, StratsearchError> {
        let matrix = signal::generate(series, strategy, params)?;
        let trade = TradeParams::from_vector(params)?;
        final_cash(series, &matrix, &trade, &self.config.backtest)
    }
}

/// Ask the oracle for every parameter the strategy needs, trade-wide
/// parameters first.
fn suggest_vector(strategy: &Strategy, oracle: &mut dyn SearchOracle) -> ParameterVector {
    let mut params = ParameterVector::new();
    for spec in specs_for(strategy) {
        let value = match spec.domain {
            ParamDomain::Int { low, high } => {
                ParamValue::Int(oracle.suggest_int(spec.name, low, high))
            }
            ParamDomain::Float { low, high } => {
                ParamValue::Float(oracle.suggest_float(spec.name, low, high))
            }
        };
        params.insert(spec.name, value);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Replays a fixed script of per-trial choices: `Low` picks each
    /// domain's lower bound, `High` the upper bound, `Outside` one past it.
    #[derive(Clone, Copy)]
    enum Pick {
        Low,
        High,
        Outside,
    }

    struct ScriptedOracle {
        script: Vec<Pick>,
        trial: usize,
        asked_names: Vec<String>,
        told: Vec<TrialOutcome>,
    }

    impl ScriptedOracle {
        fn new(script: Vec<Pick>) -> Self {
            ScriptedOracle {
                script,
                trial: 0,
                asked_names: Vec::new(),
                told: Vec::new(),
            }
        }

        fn pick(&self) -> Pick {
            self.script[(self.trial - 1) % self.script.len()]
        }
    }

    impl SearchOracle for ScriptedOracle {
        fn ask(&mut self) -> usize {
            self.trial += 1;
            self.trial - 1
        }

        fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> i64 {
            self.asked_names.push(name.to_string());
            match self.pick() {
                Pick::Low => low,
                Pick::High => high,
                Pick::Outside => high + 1,
            }
        }

        fn suggest_float(&mut self, name: &str, low: f64, high: f64) -> f64 {
            self.asked_names.push(name.to_string());
            match self.pick() {
                Pick::Low => low,
                Pick::High => high,
                Pick::Outside => high + 1.0,
            }
        }

        fn tell(&mut self, outcome: &TrialOutcome) {
            self.told.push(outcome.clone());
        }
    }

    fn wave(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 10.0 + i as f64 * 0.05)
            .collect();
        PriceSeries::from_closes("wave", &closes).unwrap()
    }

    fn optimizer(trials: usize) -> ParameterOptimizer {
        ParameterOptimizer::new(OptimizerConfig {
            trials,
            ..OptimizerConfig::default()
        })
    }

    #[test]
    fn default_budget_is_fifty() {
        assert_eq!(ParameterOptimizer::default().config().trials, 50);
    }

    #[test]
    fn runs_full_budget_and_tells_every_trial() {
        let strategy = "rsi".parse::<Strategy>().unwrap();
        let mut oracle = ScriptedOracle::new(vec![Pick::Low, Pick::High]);
        let study = optimizer(6).optimize(&strategy, &wave(200), &mut oracle).unwrap();

        assert_eq!(study.trials().len(), 6);
        assert_eq!(oracle.told.len(), 6);
        let numbers: Vec<usize> = study.trials().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(study.completed_count(), 6);
    }

    #[test]
    fn suggestion_order_trade_params_first() {
        let strategy = "roc+rsi".parse::<Strategy>().unwrap();
        let mut oracle = ScriptedOracle::new(vec![Pick::Low]);
        optimizer(1).optimize(&strategy, &wave(200), &mut oracle).unwrap();
        assert_eq!(
            oracle.asked_names,
            vec![
                "n_shares",
                "stop_loss",
                "take_profit",
                "rsi_window",
                "rsi_upper",
                "rsi_lower",
                "roc_window",
                "roc_upper",
                "roc_lower",
            ]
        );
    }

    #[test]
    fn out_of_domain_trials_fail_without_aborting() {
        let strategy = "stoch".parse::<Strategy>().unwrap();
        let mut oracle = ScriptedOracle::new(vec![Pick::Outside, Pick::Low]);
        let study = optimizer(4).optimize(&strategy, &wave(150), &mut oracle).unwrap();

        assert_eq!(study.failed_count(), 2);
        assert_eq!(study.completed_count(), 2);
        assert!(matches!(study.trials()[0].outcome, TrialOutcome::Failed(_)));
        assert!(matches!(oracle.told[0], TrialOutcome::Failed(_)));
        assert!(study.best().is_some());
    }

    #[test]
    fn all_failed_study_has_no_best() {
        // rsi_window low bound 5 still exceeds a 4-bar series
        let series = PriceSeries::from_closes("tiny", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let strategy = "rsi".parse::<Strategy>().unwrap();
        let mut oracle = ScriptedOracle::new(vec![Pick::Low]);
        let study = optimizer(3).optimize(&strategy, &series, &mut oracle).unwrap();
        assert_eq!(study.failed_count(), 3);
        assert!(study.best().is_none());
    }

    #[test]
    fn best_prefers_earliest_on_ties() {
        let strategy = "rsi".parse::<Strategy>().unwrap();
        let mut study = Study::new(strategy);
        let tagged = |n: i64| ParameterVector::new().with("n_shares", ParamValue::Int(n));
        study.push(Trial {
            number: 0,
            params: tagged(1),
            outcome: TrialOutcome::Completed(10.0),
        });
        study.push(Trial {
            number: 1,
            params: tagged(2),
            outcome: TrialOutcome::Completed(12.0),
        });
        study.push(Trial {
            number: 2,
            params: tagged(3),
            outcome: TrialOutcome::Failed("bad".into()),
        });
        study.push(Trial {
            number: 3,
            params: tagged(4),
            outcome: TrialOutcome::Completed(12.0),
        });

        let best = study.best().unwrap();
        assert_relative_eq!(best.final_cash, 12.0);
        assert_eq!(best.params, tagged(2));
    }

    #[test]
    fn evaluate_matches_trial_value() {
        let strategy = "tsi".parse::<Strategy>().unwrap();
        let series = wave(200);
        let mut oracle = ScriptedOracle::new(vec![Pick::High]);
        let opt = optimizer(1);
        let study = opt.optimize(&strategy, &series, &mut oracle).unwrap();
        let trial = &study.trials()[0];
        let value = opt.evaluate(&strategy, &series, &trial.params).unwrap();
        assert_eq!(trial.outcome, TrialOutcome::Completed(value));
    }
}
