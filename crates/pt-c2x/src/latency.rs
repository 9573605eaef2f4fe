//! Transit-delay models for the message channel.
//!
//! A model maps one send to a delay in steps.  Models may draw randomness, so
//! `delay_steps` takes `&mut self`; the channel owns its model and is the only
//! caller, which keeps a seeded run deterministic.

use pt_core::{SimRng, VehicleId};

/// Decides how many steps a message from `from` to `to` spends in transit.
pub trait LatencyModel {
    fn delay_steps(&mut self, from: VehicleId, to: VehicleId) -> u64;
}

/// Synchronous, reliable delivery: every message is visible in its send step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl LatencyModel for NoDelay {
    #[inline]
    fn delay_steps(&mut self, _from: VehicleId, _to: VehicleId) -> u64 {
        0
    }
}

/// The same delay for every message.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay(pub u64);

impl LatencyModel for FixedDelay {
    #[inline]
    fn delay_steps(&mut self, _from: VehicleId, _to: VehicleId) -> u64 {
        self.0
    }
}

/// Exponentially distributed delay, truncated to whole steps.
pub struct ExponentialDelay {
    mean_steps: f64,
    rng:        SimRng,
}

impl ExponentialDelay {
    pub fn new(mean_steps: f64, seed: u64) -> Self {
        Self { mean_steps, rng: SimRng::new(seed) }
    }

    pub fn mean_steps(&self) -> f64 {
        self.mean_steps
    }
}

impl LatencyModel for ExponentialDelay {
    fn delay_steps(&mut self, _from: VehicleId, _to: VehicleId) -> u64 {
        if self.mean_steps <= 0.0 {
            return 0;
        }
        self.rng.exponential(self.mean_steps) as u64
    }
}
