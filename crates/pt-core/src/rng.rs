//! Deterministic simulation-level RNG.
//!
//! # Determinism strategy
//!
//! The message channel is the only consumer of randomness in the protocol.
//! It owns one `SmallRng` seeded from the run's seed, so a fixed seed and a
//! fixed sequence of `send` calls always produce the same delivery delays.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG.
///
/// Used only in single-threaded contexts.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample an exponentially distributed value with the given `mean`
    /// (inverse-CDF on a uniform draw in `[0, 1)`).
    ///
    /// Returns `0.0` for a non-positive mean.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        if mean <= 0.0 {
            return 0.0;
        }
        let u: f64 = self.0.r#gen();
        -mean * (1.0 - u).ln()
    }
}
