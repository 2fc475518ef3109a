//! The random environment every simulation run draws from.
//!
//! Each run owns exactly one [`Environment`]. Nothing is shared between runs, so concurrent
//! runs never perturb each other's streams, and a seeded run always replays the same draws.

use std::ops::Range;

use rand::prelude::*;
use rand_distr::StandardNormal;

/// A per-run source of uniform and normal draws.
#[derive(Debug, Clone)]
pub struct Environment {
    rng: StdRng,
}

impl Environment {
    /// Creates an environment. With a seed the run is reproducible; without one the generator
    /// is seeded from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Uniform draw in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Normal draw with the given mean and standard deviation.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }

    /// Uniform integer draw in `range` (upper bound exclusive).
    pub fn int_range(&mut self, range: Range<u64>) -> u64 {
        self.rng.gen_range(range)
    }
}
