//! The simulator-facing trait.

use pt_core::{Direction, VehicleId};

/// A vehicle seen by a lookup, with the bumper-to-bumper gap in metres.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Neighbor {
    pub id:       VehicleId,
    pub distance: f64,
}

impl Neighbor {
    pub fn new(id: VehicleId, distance: f64) -> Self {
        Self { id, distance }
    }
}

/// Ground-truth kinematics and the lateral actuator of a traffic simulator.
///
/// Lateral offsets are measured from the centre of the vehicle's current lane,
/// positive to the left.  Lane indices grow to the left, starting at the
/// rightmost lane.
///
/// Implementations answer about any vehicle they know; the protocol only asks
/// about vehicles that exist, so unknown ids may return neutral values.
pub trait Traffic {
    /// Simulated time in seconds.
    fn time_secs(&self) -> f64;

    fn speed(&self, v: VehicleId) -> f64;
    fn max_accel(&self, v: VehicleId) -> f64;
    fn time_headway(&self, v: VehicleId) -> f64;
    fn length(&self, v: VehicleId) -> f64;
    /// Longitudinal position of the front bumper.
    fn x_position(&self, v: VehicleId) -> f64;

    fn lane_index(&self, v: VehicleId) -> i32;
    /// Legal speed limit of the vehicle's current lane.
    fn lane_max_speed(&self, v: VehicleId) -> f64;

    fn lateral_offset(&self, v: VehicleId) -> f64;
    fn lateral_speed(&self, v: VehicleId) -> f64;
    fn max_lateral_speed(&self, v: VehicleId) -> f64;
    /// Lateral distance to the lane the vehicle started in.
    fn distance_to_original_lane(&self, v: VehicleId) -> f64;

    /// Raw neighbour lookup without range or platoon filtering.
    ///
    /// For `Left`/`Right`, every vehicle in that adjacent lane ahead of
    /// (`front`) or behind `v`.  For `Same`, at most the single nearest
    /// vehicle in `v`'s lane in that longitudinal direction.
    fn neighbors(&self, v: VehicleId, direction: Direction, front: bool) -> Vec<Neighbor>;

    /// Request a lateral displacement of `lateral_distance` metres.
    fn change_sublane(&mut self, v: VehicleId, lateral_distance: f64);

    /// Centred on the lane and not moving sideways.
    fn is_centered(&self, v: VehicleId) -> bool {
        self.lateral_offset(v).abs() <= 0.01 && self.lateral_speed(v) == 0.0
    }
}
