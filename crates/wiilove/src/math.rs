//! Random number generation for `love.math`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Pseudo-random generator behind `love.math.random`
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    rng: StdRng,
    seed: u64,
}

impl RandomGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the current time
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        tracing::debug!("Seeding random generator from clock: {}", seed);
        Self::from_seed(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `love.math.random()`: uniform in `[0, 1)`
    pub fn random(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// `love.math.random(max)`: integer in `1..=max`
    pub fn random_max(&mut self, max: i64) -> i64 {
        self.random_range(1, max)
    }

    /// `love.math.random(min, max)`: integer in `min..=max`, bounds in either order
    pub fn random_range(&mut self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(low..=high)
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::from_clock()
    }
}
