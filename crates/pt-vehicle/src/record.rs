//! Per-member metrics recorded while driving.

use pt_core::Direction;

use crate::state::{State, Visit};

/// Everything one platoon member records over a run.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRecord {
    /// Every state entered, in order; never rewritten.
    pub states:     Vec<Visit>,
    /// Lane indices visited, consecutive duplicates collapsed.
    pub lanes:      Vec<i32>,
    /// Lowest observed speed, rounded to 2 decimals.
    pub speed_min:  f64,
    pub speed_max:  f64,
    /// Measured overtaking durations (s), leader only.
    pub ot_times:   Vec<f64>,
}

impl Default for VehicleRecord {
    fn default() -> Self {
        Self {
            states:    Vec::new(),
            lanes:     Vec::new(),
            speed_min: f64::INFINITY,
            speed_max: f64::NEG_INFINITY,
            ot_times:  Vec::new(),
        }
    }
}

impl VehicleRecord {
    /// Append a state, tagging it as a return-trip state when `direction` is
    /// right.
    pub fn push_state(&mut self, state: State, direction: Direction) -> Visit {
        let visit = if direction == Direction::Right && !state.is_direction_neutral() {
            Visit::right(state)
        } else {
            Visit::left(state)
        };
        self.states.push(visit);
        visit
    }

    pub fn push_lane(&mut self, lane: i32) {
        if self.lanes.last() != Some(&lane) {
            self.lanes.push(lane);
        }
    }

    pub fn observe_speed(&mut self, speed: f64) {
        let speed = round2(speed);
        if speed < self.speed_min {
            self.speed_min = speed;
        }
        if speed > self.speed_max {
            self.speed_max = speed;
        }
    }

    pub fn metric(&self, key: MetricKey) -> MetricValue {
        match key {
            MetricKey::StatesVisited   => MetricValue::States(self.states.clone()),
            MetricKey::LanesVisited    => MetricValue::Lanes(self.lanes.clone()),
            MetricKey::SpeedMin        => MetricValue::Speed(self.speed_min),
            MetricKey::SpeedMax        => MetricValue::Speed(self.speed_max),
            MetricKey::OvertakingTimes => MetricValue::Durations(self.ot_times.clone()),
        }
    }
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Selects one field of a [`VehicleRecord`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MetricKey {
    StatesVisited,
    LanesVisited,
    SpeedMin,
    SpeedMax,
    OvertakingTimes,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    States(Vec<Visit>),
    Lanes(Vec<i32>),
    Speed(f64),
    Durations(Vec<f64>),
}
