//! Injectable randomness for allocation and shuffling.
//!
//! Services hold an `Arc<dyn RandomSource>` instead of touching a global RNG so
//! tests can pin every draw with a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Uniform integer draws, safe to share across concurrent generation runs.
pub trait RandomSource: Send + Sync {
    /// Draws uniformly from the inclusive range `[low, high]`.
    ///
    /// Returns `low` when `high <= low`.
    fn uniform_int(&self, low: u64, high: u64) -> u64;
}

/// Shuffles `items` in place with Fisher–Yates, drawing from `random`.
///
/// Every permutation is equally likely provided `random` is uniform.
pub fn shuffle<T>(random: &dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = random.uniform_int(0, i as u64);
        // j <= i, which always fits back into usize.
        items.swap(i, usize::try_from(j).unwrap_or(i));
    }
}

/// Draws from the calling thread's RNG. No shared state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform_int(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}

/// Reproducible source seeded once; draws are serialised through a mutex.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_int(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        // A panic mid-draw cannot leave the RNG in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(low..=high)
    }
}
