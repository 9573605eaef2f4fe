//! Fluent builder for constructing a [`Platoon`] and its start formation.

use pt_c2x::C2x;
use pt_core::{OvertakingParams, VehicleId};
use pt_traffic::Radar;

use crate::{Follower, Leader, Platoon, PlatoonError, PlatoonResult};

/// Start placement of one member, for the driver to insert into its traffic
/// simulator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Slot {
    pub id:     VehicleId,
    /// Front bumper position along the route (m).
    pub x:      f64,
    pub lane:   i32,
    pub speed:  f64,
    pub length: f64,
}

/// Start placement of the whole platoon, leader first.
#[derive(Clone, Debug, PartialEq)]
pub struct Formation {
    pub route: String,
    pub slots: Vec<Slot>,
}

impl Formation {
    pub fn leader_position(&self) -> Option<f64> {
        self.slots.first().map(|s| s.x)
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.slots.iter().map(|s| s.id)
    }
}

/// Fluent builder for [`Platoon`].
///
/// | Method                | Default      |
/// |-----------------------|--------------|
/// | `.members(n)`         | 5            |
/// | `.desired_speed(v)`   | 30.55 m/s    |
/// | `.route(id)`          | `"route_0"`  |
/// | `.start_position(x)`  | 20 m         |
/// | `.lane(i)`            | 0            |
/// | `.vehicle_length(l)`  | 4 m          |
/// | `.first_id(id)`       | `VehicleId(0)` |
/// | `.channel(c2x)`       | `C2x::from_params(&params)` |
///
/// ```rust,ignore
/// let (platoon, formation) = PlatoonBuilder::new(OvertakingParams::default())
///     .members(3)
///     .start_position(50.0)
///     .build()?;
/// assert_eq!(formation.slots.len(), 3);
/// ```
pub struct PlatoonBuilder {
    params:         OvertakingParams,
    members:        usize,
    desired_speed:  f64,
    route:          String,
    start_position: f64,
    lane:           i32,
    vehicle_length: f64,
    first_id:       VehicleId,
    channel:        Option<C2x>,
}

impl PlatoonBuilder {
    pub fn new(params: OvertakingParams) -> Self {
        Self {
            params,
            members:        5,
            desired_speed:  30.55,
            route:          "route_0".to_string(),
            start_position: 20.0,
            lane:           0,
            vehicle_length: 4.0,
            first_id:       VehicleId(0),
            channel:        None,
        }
    }

    /// Number of members including the leader.
    pub fn members(mut self, n: usize) -> Self {
        self.members = n;
        self
    }

    pub fn desired_speed(mut self, v: f64) -> Self {
        self.desired_speed = v;
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Position of the rearmost slot's reference point.
    pub fn start_position(mut self, x: f64) -> Self {
        self.start_position = x;
        self
    }

    pub fn lane(mut self, lane: i32) -> Self {
        self.lane = lane;
        self
    }

    pub fn vehicle_length(mut self, length: f64) -> Self {
        self.vehicle_length = length;
        self
    }

    /// Id of the leader; followers get the next ids in order.
    pub fn first_id(mut self, id: VehicleId) -> Self {
        self.first_id = id;
        self
    }

    /// Replace the channel derived from the params (e.g. a lossy test model).
    pub fn channel(mut self, c2x: C2x) -> Self {
        self.channel = Some(c2x);
        self
    }

    pub fn build(self) -> PlatoonResult<(Platoon, Formation)> {
        self.params.validate()?;
        let n = self.members;
        if n == 0 {
            return Err(PlatoonError::EmptyPlatoon);
        }

        // ── Assign ids front to back ──────────────────────────────────────
        let first = self.first_id.0;
        let overflow = || PlatoonError::IdOverflow { first, count: n };
        // `end` stays <= u32::MAX, so the last id is never INVALID.
        let end = u32::try_from(n)
            .ok()
            .and_then(|count| first.checked_add(count))
            .ok_or_else(overflow)?;
        let ids: Vec<VehicleId> = (first..end).map(VehicleId).collect();

        // ── Start placement ───────────────────────────────────────────────
        let spacing = self.params.inter_vehicle_distance + self.vehicle_length;
        let slots = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Slot {
                id,
                x:      (n - i + 1) as f64 * spacing + self.start_position,
                lane:   self.lane,
                speed:  self.desired_speed,
                length: self.vehicle_length,
            })
            .collect();

        // ── Members ───────────────────────────────────────────────────────
        let radar = Radar::from_params(&self.params, ids.clone());
        let leader_id = ids[0];
        let leader = Leader::new(
            leader_id,
            ids[1..].to_vec(),
            self.desired_speed,
            radar.clone(),
            &self.params,
        );
        let followers = ids
            .windows(2)
            .map(|pair| Follower::new(pair[1], leader_id, pair[0], radar.clone()))
            .collect();

        let c2x = self.channel.unwrap_or_else(|| C2x::from_params(&self.params));
        let platoon = Platoon::new(leader, followers, c2x, self.params);
        Ok((platoon, Formation { route: self.route, slots }))
    }
}
