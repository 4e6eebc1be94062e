//! Random source backed by the `rand` crate

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::ports::RandomSource;

/// [`RandomSource`] over any `rand` generator
#[derive(Debug, Clone)]
pub struct RngRandomSource<R> {
    rng: R,
}

impl<R: Rng> RngRandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRandomSource<ThreadRng> {
    /// Non-reproducible source for normal runs
    pub fn from_thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RngRandomSource<StdRng> {
    /// Reproducible source for `--seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngRandomSource<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
