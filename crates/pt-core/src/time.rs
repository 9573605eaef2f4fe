//! Simulation time model.
//!
//! # Design
//!
//! Every platoon member counts protocol steps with a `Tick`.  The mapping to
//! simulated seconds is held in `StepClock`:
//!
//!   elapsed_secs = tick * step_length_secs
//!
//! Message delivery gates, timers and backoff are all expressed in ticks, so
//! the protocol is exact and independent of the simulator's step length.
//! Only a driver that moves vehicles needs the clock.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The following tick.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── StepClock ─────────────────────────────────────────────────────────────────

/// Converts between step counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepClock {
    /// Simulated seconds represented by one step.
    pub step_length_secs: f64,
    /// The current step, advanced by `StepClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl StepClock {
    pub fn new(step_length_secs: f64) -> Self {
        Self { step_length_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    /// Elapsed simulated seconds since step 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.step_length_secs
    }
}

impl fmt::Display for StepClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} s)", self.current_tick, self.elapsed_secs())
    }
}
