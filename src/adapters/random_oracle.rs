//! Uniform random search oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::optimizer::TrialOutcome;
use crate::ports::oracle_port::SearchOracle;

/// Samples every parameter uniformly from its domain, ignoring feedback.
pub struct RandomOracle {
    rng: StdRng,
    trials: usize,
}

impl RandomOracle {
    pub fn new(seed: u64) -> Self {
        RandomOracle {
            rng: StdRng::seed_from_u64(seed),
            trials: 0,
        }
    }
}

pub(crate) fn uniform_int(rng: &mut StdRng, low: i64, high: i64) -> i64 {
    if low >= high {
        return low;
    }
    rng.gen_range(low..=high)
}

pub(crate) fn uniform_float(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    if low >= high {
        return low;
    }
    rng.gen_range(low..=high)
}

impl SearchOracle for RandomOracle {
    fn ask(&mut self) -> usize {
        self.trials += 1;
        self.trials - 1
    }

    fn suggest_int(&mut self, _name: &str, low: i64, high: i64) -> i64 {
        uniform_int(&mut self.rng, low, high)
    }

    fn suggest_float(&mut self, _name: &str, low: f64, high: f64) -> f64 {
        uniform_float(&mut self.rng, low, high)
    }

    fn tell(&mut self, _outcome: &TrialOutcome) {}
}
