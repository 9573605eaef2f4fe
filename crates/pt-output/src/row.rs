//! Plain data row types written by output backends.

use pt_core::VehicleId;
use pt_vehicle::{ProtocolEvent, VehicleRecord};

/// One protocol event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// Platoon tick the event was produced in.
    pub tick:    u64,
    /// The member's own step counter.
    pub step:    u64,
    pub vehicle: u32,
    /// `EventKind::name`, e.g. `state_changed`.
    pub event:   &'static str,
    pub detail:  String,
}

impl EventRow {
    pub fn from_event(tick: u64, event: &ProtocolEvent) -> Self {
        Self {
            tick,
            step:    event.step.0,
            vehicle: event.vehicle.0,
            event:   event.kind.name(),
            detail:  event.kind.to_string(),
        }
    }
}

/// One entry of a member's visited-states metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRow {
    pub vehicle: u32,
    /// Position in the sequence, starting at 0.
    pub index:   usize,
    /// `R_`-prefixed on the return trip.
    pub state:   String,
}

impl VisitRow {
    pub fn from_record(vehicle: VehicleId, record: &VehicleRecord) -> Vec<VisitRow> {
        record
            .states
            .iter()
            .enumerate()
            .map(|(index, visit)| VisitRow { vehicle: vehicle.0, index, state: visit.to_string() })
            .collect()
    }
}

/// Final metrics of one member.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub vehicle:          u32,
    pub states_visited:   usize,
    /// Visited lanes joined with `|`, e.g. `0|1|0`.
    pub lanes:            String,
    /// `NaN` when no speed was observed.
    pub speed_min:        f64,
    pub speed_max:        f64,
    /// Measured overtaking durations joined with `|`.
    pub overtaking_times: String,
}

impl SummaryRow {
    pub fn from_record(vehicle: VehicleId, record: &VehicleRecord) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { f64::NAN };
        Self {
            vehicle:          vehicle.0,
            states_visited:   record.states.len(),
            lanes:            join(record.lanes.iter()),
            speed_min:        finite(record.speed_min),
            speed_max:        finite(record.speed_max),
            overtaking_times: join(record.ot_times.iter()),
        }
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join("|")
}
