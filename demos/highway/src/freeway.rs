//! A toy freeway that moves the vehicles of a [`TrafficSnapshot`].
//!
//! Longitudinal motion is constant-speed with a crude car-following rule;
//! lateral motion follows the platoon's displacement requests at each
//! vehicle's maximum lateral speed.

use std::collections::BTreeMap;

use pt_core::{Direction, StepClock, VehicleId};
use pt_traffic::{Traffic, TrafficSnapshot, VehicleSample};
use tracing::trace;

/// Lateral remainder below which a displacement counts as done (m).
const LATERAL_EPS: f64 = 1e-9;
/// Standstill gap added to the headway gap when following (m).
const MIN_GAP: f64 = 5.0;

pub struct Freeway {
    pub road:  TrafficSnapshot,
    pub clock: StepClock,
    /// Cruise speed per vehicle.
    desired:   BTreeMap<VehicleId, f64>,
    /// Lateral distance still to travel, positive to the left.
    remaining: BTreeMap<VehicleId, f64>,
}

impl Freeway {
    pub fn new(lane_width: f64, step_secs: f64) -> Self {
        Self {
            road: TrafficSnapshot::new(lane_width),
            clock: StepClock::new(step_secs),
            desired: BTreeMap::new(),
            remaining: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, id: VehicleId, sample: VehicleSample) {
        self.desired.insert(id, sample.speed);
        self.road.insert(id, sample);
    }

    /// Advance every vehicle by one step.
    pub fn advance(&mut self) {
        for (id, lateral) in self.road.take_lateral_requests() {
            trace!(vehicle = %id, lateral, "lateral request");
            self.remaining.insert(id, lateral);
        }

        let ids: Vec<VehicleId> = self.road.ids().collect();
        let speeds: Vec<(VehicleId, f64)> = ids.iter().map(|&id| (id, self.following_speed(id))).collect();

        let dt = self.clock.step_length_secs;
        let half_lane = self.road.lane_width / 2.0;
        let lane_width = self.road.lane_width;
        for (id, speed) in speeds {
            let left = self.remaining.get(&id).copied().unwrap_or(0.0);
            let Some(s) = self.road.get_mut(id) else {
                continue;
            };
            s.speed = speed;
            s.x += speed * dt;

            if left.abs() > LATERAL_EPS {
                let step = left.signum() * left.abs().min(s.max_lateral_speed * dt);
                s.lateral_offset += step;
                s.lateral_speed = step / dt;
                self.remaining.insert(id, left - step);
            } else {
                s.lateral_speed = 0.0;
                self.remaining.remove(&id);
            }

            if s.lateral_offset > half_lane {
                s.lane += 1;
                s.lateral_offset -= lane_width;
            } else if s.lateral_offset < -half_lane {
                s.lane -= 1;
                s.lateral_offset += lane_width;
            }
        }
        self.clock.advance();
        self.road.time_secs = self.clock.elapsed_secs();
    }

    /// Cruise speed, capped at the speed of a too-close vehicle ahead.
    fn following_speed(&self, id: VehicleId) -> f64 {
        let desired = self.desired.get(&id).copied().unwrap_or(0.0);
        let ahead = self.road.neighbors(id, Direction::Same, true);
        match ahead.first() {
            Some(n) => {
                let gap_needed = self.road.time_headway(id) * self.road.speed(id) + MIN_GAP;
                if n.distance < gap_needed {
                    desired.min(self.road.speed(n.id))
                } else {
                    desired
                }
            }
            None => desired,
        }
    }
}
