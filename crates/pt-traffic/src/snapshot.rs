//! In-memory [`Traffic`] implementation.
//!
//! A `TrafficSnapshot` is a straight multi-lane road with vehicles placed on
//! it by hand.  Neighbour lookups are computed from longitudinal positions
//! and lane indices.  Lateral commands are only recorded; whoever drives the
//! snapshot decides how vehicles actually move (see
//! [`take_lateral_requests`][TrafficSnapshot::take_lateral_requests]).

use std::collections::BTreeMap;

use pt_core::{Direction, VehicleId};

use crate::traffic::{Neighbor, Traffic};

/// Kinematic state and vehicle-type parameters of one vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleSample {
    /// Front-bumper position along the road (m).
    pub x:                 f64,
    pub length:            f64,
    pub lane:              i32,
    /// Offset from the current lane centre, positive to the left (m).
    pub lateral_offset:    f64,
    pub lateral_speed:     f64,
    pub speed:             f64,
    pub max_accel:         f64,
    pub time_headway:      f64,
    pub max_lateral_speed: f64,
    /// Lane the vehicle was inserted in.
    pub origin_lane:       i32,
}

impl VehicleSample {
    /// A passenger-car-sized vehicle centred in `lane`.
    pub fn new(x: f64, lane: i32, speed: f64) -> Self {
        Self {
            x,
            length:            4.0,
            lane,
            lateral_offset:    0.0,
            lateral_speed:     0.0,
            speed,
            max_accel:         2.5,
            time_headway:      1.0,
            max_lateral_speed: 1.0,
            origin_lane:       lane,
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_max_accel(mut self, max_accel: f64) -> Self {
        self.max_accel = max_accel;
        self
    }

    pub fn with_time_headway(mut self, time_headway: f64) -> Self {
        self.time_headway = time_headway;
        self
    }

    pub fn with_max_lateral_speed(mut self, max_lateral_speed: f64) -> Self {
        self.max_lateral_speed = max_lateral_speed;
        self
    }

    /// Rear-bumper position.
    #[inline]
    pub fn rear(&self) -> f64 {
        self.x - self.length
    }
}

/// A hand-placed road scene.
#[derive(Clone, Debug)]
pub struct TrafficSnapshot {
    pub time_secs:       f64,
    pub lane_width:      f64,
    default_lane_limit:  f64,
    lane_limits:         BTreeMap<i32, f64>,
    vehicles:            BTreeMap<VehicleId, VehicleSample>,
    lateral_requests:    Vec<(VehicleId, f64)>,
}

impl TrafficSnapshot {
    pub fn new(lane_width: f64) -> Self {
        Self {
            time_secs:          0.0,
            lane_width,
            default_lane_limit: 36.11,
            lane_limits:        BTreeMap::new(),
            vehicles:           BTreeMap::new(),
            lateral_requests:   Vec::new(),
        }
    }

    /// Speed limit of every lane without an explicit limit.
    pub fn with_speed_limit(mut self, limit: f64) -> Self {
        self.default_lane_limit = limit;
        self
    }

    pub fn set_lane_speed_limit(&mut self, lane: i32, limit: f64) {
        self.lane_limits.insert(lane, limit);
    }

    pub fn lane_speed_limit(&self, lane: i32) -> f64 {
        self.lane_limits.get(&lane).copied().unwrap_or(self.default_lane_limit)
    }

    // ── Scene editing ─────────────────────────────────────────────────────

    pub fn insert(&mut self, id: VehicleId, sample: VehicleSample) {
        self.vehicles.insert(id, sample);
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<VehicleSample> {
        self.vehicles.remove(&id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&VehicleSample> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut VehicleSample> {
        self.vehicles.get_mut(&id)
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains_key(&id)
    }

    /// All vehicle ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.keys().copied()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VehicleId, &mut VehicleSample)> + '_ {
        self.vehicles.iter_mut().map(|(id, s)| (*id, s))
    }

    pub fn set_speed(&mut self, id: VehicleId, speed: f64) {
        if let Some(s) = self.vehicles.get_mut(&id) {
            s.speed = speed;
        }
    }

    pub fn set_x(&mut self, id: VehicleId, x: f64) {
        if let Some(s) = self.vehicles.get_mut(&id) {
            s.x = x;
        }
    }

    pub fn set_lane(&mut self, id: VehicleId, lane: i32) {
        if let Some(s) = self.vehicles.get_mut(&id) {
            s.lane = lane;
        }
    }

    pub fn set_lateral(&mut self, id: VehicleId, offset: f64, lateral_speed: f64) {
        if let Some(s) = self.vehicles.get_mut(&id) {
            s.lateral_offset = offset;
            s.lateral_speed = lateral_speed;
        }
    }

    // ── Actuator log ──────────────────────────────────────────────────────

    /// Every `change_sublane` request since the last take, in call order.
    pub fn lateral_requests(&self) -> &[(VehicleId, f64)] {
        &self.lateral_requests
    }

    pub fn take_lateral_requests(&mut self) -> Vec<(VehicleId, f64)> {
        std::mem::take(&mut self.lateral_requests)
    }

    fn sample(&self, v: VehicleId) -> Option<&VehicleSample> {
        self.vehicles.get(&v)
    }
}

impl Traffic for TrafficSnapshot {
    fn time_secs(&self) -> f64 {
        self.time_secs
    }

    fn speed(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.speed)
    }

    fn max_accel(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.max_accel)
    }

    fn time_headway(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.time_headway)
    }

    fn length(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.length)
    }

    fn x_position(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.x)
    }

    fn lane_index(&self, v: VehicleId) -> i32 {
        self.sample(v).map_or(0, |s| s.lane)
    }

    fn lane_max_speed(&self, v: VehicleId) -> f64 {
        self.lane_speed_limit(self.lane_index(v))
    }

    fn lateral_offset(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.lateral_offset)
    }

    fn lateral_speed(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.lateral_speed)
    }

    fn max_lateral_speed(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| s.max_lateral_speed)
    }

    fn distance_to_original_lane(&self, v: VehicleId) -> f64 {
        self.sample(v).map_or(0.0, |s| {
            f64::from(s.lane - s.origin_lane) * self.lane_width + s.lateral_offset
        })
    }

    fn neighbors(&self, v: VehicleId, direction: Direction, front: bool) -> Vec<Neighbor> {
        let Some(me) = self.sample(v) else {
            return Vec::new();
        };
        let lane = me.lane + direction.signed_step();

        let mut found: Vec<Neighbor> = self
            .vehicles
            .iter()
            .filter(|(id, s)| **id != v && s.lane == lane)
            .filter_map(|(id, s)| {
                if front && s.x > me.x {
                    Some(Neighbor::new(*id, s.rear() - me.x))
                } else if !front && s.x < me.x {
                    Some(Neighbor::new(*id, me.rear() - s.x))
                } else {
                    None
                }
            })
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if direction == Direction::Same {
            found.truncate(1);
        }
        found
    }

    fn change_sublane(&mut self, v: VehicleId, lateral_distance: f64) {
        self.lateral_requests.push((v, lateral_distance));
    }
}
