//! Sequential model-based oracle: Gaussian perturbation of top-k elites.
//!
//! The first `startup_trials` trials sample uniformly. After that each trial
//! either explores uniformly (with probability `explore_ratio`) or picks one
//! elite among the best `top_k` completed trials, weighted by rank, and
//! samples every parameter from a normal centred on the elite's value with
//! `sigma = sigma_ratio * (high - low)`. Samples are clamped to the domain
//! and integers are rounded.

use std::collections::BTreeMap;

use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::adapters::random_oracle::{uniform_float, uniform_int};
use crate::domain::optimizer::TrialOutcome;
use crate::ports::oracle_port::SearchOracle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianConfig {
    pub startup_trials: usize,
    pub explore_ratio: f64,
    pub top_k: usize,
    pub sigma_ratio: f64,
}

impl Default for GaussianConfig {
    fn default() -> Self {
        GaussianConfig {
            startup_trials: 10,
            explore_ratio: 0.2,
            top_k: 5,
            sigma_ratio: 0.1,
        }
    }
}

type Sample = BTreeMap<String, f64>;

pub struct GaussianTopKOracle {
    config: GaussianConfig,
    rng: StdRng,
    trials: usize,
    /// Completed trials as (parameters, value), in completion order.
    history: Vec<(Sample, f64)>,
    current: Sample,
    /// Index into `history` of the elite guiding the current trial.
    elite: Option<usize>,
}

impl GaussianTopKOracle {
    pub fn new(seed: u64, config: GaussianConfig) -> Self {
        GaussianTopKOracle {
            config,
            rng: StdRng::seed_from_u64(seed),
            trials: 0,
            history: Vec::new(),
            current: Sample::new(),
            elite: None,
        }
    }

    /// History indices of the best `top_k` trials, best first; earlier
    /// trials win ties.
    fn elites(&self) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.history.len()).collect();
        ranked.sort_by(|&a, &b| self.history[b].1.total_cmp(&self.history[a].1).then(a.cmp(&b)));
        ranked.truncate(self.config.top_k.max(1));
        ranked
    }

    fn choose_elite(&mut self) -> Option<usize> {
        if self.trials <= self.config.startup_trials || self.history.is_empty() {
            return None;
        }
        if self.rng.gen_bool(self.config.explore_ratio.clamp(0.0, 1.0)) {
            return None;
        }
        let elites = self.elites();
        // rank 1 gets weight k, rank k gets weight 1
        let weights: Vec<usize> = (1..=elites.len()).rev().collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(elites[dist.sample(&mut self.rng)])
    }

    fn centre(&self, name: &str) -> Option<f64> {
        self.elite
            .and_then(|i| self.history.get(i))
            .and_then(|(sample, _)| sample.get(name).copied())
    }

    fn perturb(&mut self, centre: f64, low: f64, high: f64) -> f64 {
        let sigma = self.config.sigma_ratio * (high - low);
        let raw = match Normal::new(centre, sigma) {
            Ok(normal) if sigma > 0.0 => normal.sample(&mut self.rng),
            _ => centre,
        };
        raw.clamp(low, high)
    }
}

impl SearchOracle for GaussianTopKOracle {
    fn ask(&mut self) -> usize {
        let number = self.trials;
        self.trials += 1;
        self.current.clear();
        self.elite = self.choose_elite();
        number
    }

    fn suggest_int(&mut self, name: &str, low: i64, high: i64) -> i64 {
        let value = match self.centre(name) {
            Some(c) => {
                let v = self.perturb(c, low as f64, high as f64).round() as i64;
                v.clamp(low, high)
            }
            None => uniform_int(&mut self.rng, low, high),
        };
        self.current.insert(name.to_string(), value as f64);
        value
    }

    fn suggest_float(&mut self, name: &str, low: f64, high: f64) -> f64 {
        let value = match self.centre(name) {
            Some(c) => self.perturb(c, low, high),
            None => uniform_float(&mut self.rng, low, high),
        };
        self.current.insert(name.to_string(), value);
        value
    }

    fn tell(&mut self, outcome: &TrialOutcome) {
        let sample = std::mem::take(&mut self.current);
        if let TrialOutcome::Completed(value) = outcome {
            self.history.push((sample, *value));
        }
    }
}
