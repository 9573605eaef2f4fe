//! Static configuration consumed by the overtaking protocol.
//!
//! `OvertakingParams` is loaded once (typically from JSON by the application
//! crate) and only ever read by the core.  `Default` gives the conference
//! setup; [`OvertakingParams::thesis`] gives the reliable-channel setup used
//! by the state-transfer tests.

use crate::{PtError, PtResult};

/// All numeric thresholds of the cooperative overtaking algorithm.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OvertakingParams {
    // ── Simulation geometry ───────────────────────────────────────────────

    /// Simulated seconds per step.
    pub step_length_secs: f64,
    /// Lane width in metres.
    pub lane_width: f64,
    /// Minimum lateral offset (m) before a sign flip counts as a lane-marking
    /// crossing.
    pub lane_offset_min: f64,
    /// Relative threshold inflation applied to avoid decision flapping.
    pub oscillation_mod: f64,

    // ── Messaging ─────────────────────────────────────────────────────────

    /// Mean message transit delay in steps (exponentially distributed).
    /// `0` gives a synchronous, reliable channel.
    pub mean_msg_delay_steps: f64,
    /// Seed of the channel's delay sampling.
    pub c2x_seed: u64,

    // ── Algorithm ─────────────────────────────────────────────────────────

    /// Consecutive steps an overtaken vehicle may go undetected during a lane
    /// change before the change is aborted (abort on `max_not_detected + 1`).
    pub max_not_detected: u32,
    /// Backoff is `2^exponent` steps, exponent bounded by these two.
    pub min_backoff: u32,
    pub max_backoff: u32,
    /// Timeout (steps) of every reply-waiting state.
    pub max_timer: u32,
    /// Maximum length (m) of a vehicle that may be overtaken.
    pub truck_max_length: f64,
    /// An overtaking maneuver predicted to take longer (s) is not started.
    pub max_overtaking_time: f64,
    /// Minimum speed advantage (m/s) on the overtaking lane.
    pub min_overtaking_speed_delta: f64,
    /// Only vehicles within `factor · safety distance` are worth overtaking.
    pub factor_safety_distance: f64,
    /// Accepted deceleration (m/s², ≤ 0) of the rear-left vehicle when
    /// deciding to move left.
    pub max_accel_vehicle_left: f64,
    /// Accepted deceleration of any rear vehicle while already merging.
    pub max_accel_rear_abort: f64,
    /// Accepted deceleration of the rear-right vehicle when deciding to
    /// move right.
    pub max_accel_vehicle_right: f64,
    /// Reaction time (s) of other drivers.
    pub reaction_time: f64,
    /// Desired time gap (s) of other drivers.
    pub time_gap: f64,
    /// Minimum gap (m) of a non-platooning truck.
    pub truck_min_gap: f64,
    /// Time headway (s) of a non-platooning truck.
    pub truck_headway: f64,
    /// Seconds to stay in the original lane after returning.
    pub time_stay_in_original_lane: f64,
    /// Lateral divergence (m) at which a platoon member counts as no longer
    /// following.
    pub member_max_offset: f64,

    // ── Sensors & formation ───────────────────────────────────────────────

    /// Radar range (m) ahead.
    pub radar_front: f64,
    /// Radar range (m) behind.
    pub radar_rear: f64,
    /// Gap (m) between consecutive platoon members at insertion.
    pub inter_vehicle_distance: f64,
}

impl Default for OvertakingParams {
    fn default() -> Self {
        Self {
            step_length_secs:           0.01,
            lane_width:                 3.2,
            lane_offset_min:            0.5,
            oscillation_mod:            0.01,
            mean_msg_delay_steps:       5.0,
            c2x_seed:                   23_422,
            max_not_detected:           3,
            min_backoff:                5,
            max_backoff:                8,
            max_timer:                  20,
            truck_max_length:           18.75,
            max_overtaking_time:        100_000_000.0,
            min_overtaking_speed_delta: 0.1,
            factor_safety_distance:     100.0,
            max_accel_vehicle_left:     -1.0,
            max_accel_rear_abort:       -3.5,
            max_accel_vehicle_right:    0.0,
            reaction_time:              1.0,
            time_gap:                   0.8,
            truck_min_gap:              50.0,
            truck_headway:              1.8,
            time_stay_in_original_lane: 10.0,
            member_max_offset:          0.4,
            radar_front:                160.0,
            radar_rear:                 80.0,
            inter_vehicle_distance:     5.0,
        }
    }
}

impl OvertakingParams {
    /// Reliable channel, 45 s maximum overtaking time, 2.7 m/s minimum speed
    /// advantage.
    pub fn thesis() -> Self {
        Self {
            mean_msg_delay_steps:       0.0,
            max_overtaking_time:        45.0,
            min_overtaking_speed_delta: 2.7,
            ..Self::default()
        }
    }

    /// Multiplier applied to thresholds while not maneuvering.
    #[inline]
    pub fn oscillation_factor(&self) -> f64 {
        1.0 + self.oscillation_mod
    }

    /// Reject configurations the protocol cannot run with.
    pub fn validate(&self) -> PtResult<()> {
        if !(self.step_length_secs > 0.0) {
            return Err(PtError::Config(format!(
                "step_length_secs must be positive, got {}",
                self.step_length_secs
            )));
        }
        if !(self.lane_width > 0.0) {
            return Err(PtError::Config(format!(
                "lane_width must be positive, got {}",
                self.lane_width
            )));
        }
        if self.mean_msg_delay_steps < 0.0 || self.mean_msg_delay_steps.is_nan() {
            return Err(PtError::Config(format!(
                "mean_msg_delay_steps must be >= 0, got {}",
                self.mean_msg_delay_steps
            )));
        }
        if self.min_backoff > self.max_backoff {
            return Err(PtError::Config(format!(
                "min_backoff ({}) exceeds max_backoff ({})",
                self.min_backoff, self.max_backoff
            )));
        }
        if self.max_backoff >= 32 {
            return Err(PtError::Config(format!(
                "max_backoff must be below 32, got {}",
                self.max_backoff
            )));
        }
        if self.max_timer == 0 {
            return Err(PtError::Config("max_timer must be at least 1".into()));
        }
        if !(self.radar_front > 0.0) || !(self.radar_rear > 0.0) {
            return Err(PtError::Config(format!(
                "radar ranges must be positive, got front={} rear={}",
                self.radar_front, self.radar_rear
            )));
        }
        Ok(())
    }
}
