//! Range-limited, platoon-blind view of the neighbour lookups.
//!
//! Side lookups return every non-member within range.  Same-lane lookups
//! only ever see the nearest vehicle: if that is a platoon member the lookup
//! is empty, since a member hides whatever drives beyond it.

use pt_core::{Direction, OvertakingParams, VehicleId};

use crate::traffic::{Neighbor, Traffic};

/// How to pick among several detected vehicles.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Selection {
    Closest,
    Slowest,
    All,
}

#[derive(Clone, Debug)]
pub struct Radar {
    pub front_range: f64,
    pub rear_range:  f64,
    members:         Vec<VehicleId>,
}

impl Radar {
    pub fn new(front_range: f64, rear_range: f64, members: Vec<VehicleId>) -> Self {
        Self { front_range, rear_range, members }
    }

    pub fn from_params(params: &OvertakingParams, members: Vec<VehicleId>) -> Self {
        Self::new(params.radar_front, params.radar_rear, members)
    }

    /// Platoon members, front to back.
    pub fn members(&self) -> &[VehicleId] {
        &self.members
    }

    #[inline]
    pub fn is_member(&self, v: VehicleId) -> bool {
        self.members.contains(&v)
    }

    fn range(&self, front: bool) -> f64 {
        if front { self.front_range } else { self.rear_range }
    }

    /// Every visible vehicle in `direction`, nearest first.
    pub fn scan<T: Traffic + ?Sized>(
        &self,
        traffic:   &T,
        v:         VehicleId,
        direction: Direction,
        front:     bool,
    ) -> Vec<Neighbor> {
        let range = self.range(front);
        let mut raw = traffic.neighbors(v, direction, front);
        if direction == Direction::Same {
            raw.sort_by(|a, b| a.distance.total_cmp(&b.distance));
            raw.truncate(1);
        }
        let mut seen: Vec<Neighbor> = raw
            .into_iter()
            .filter(|n| !self.is_member(n.id) && n.distance <= range)
            .collect();
        seen.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        seen
    }

    /// Visible vehicles picked by `selection`; at most one unless `All`.
    pub fn select<T: Traffic + ?Sized>(
        &self,
        traffic:   &T,
        v:         VehicleId,
        direction: Direction,
        front:     bool,
        selection: Selection,
    ) -> Vec<Neighbor> {
        let seen = self.scan(traffic, v, direction, front);
        match selection {
            Selection::All => seen,
            Selection::Closest => seen.into_iter().take(1).collect(),
            Selection::Slowest => seen
                .into_iter()
                .min_by(|a, b| traffic.speed(a.id).total_cmp(&traffic.speed(b.id)))
                .into_iter()
                .collect(),
        }
    }

    pub fn closest<T: Traffic + ?Sized>(
        &self,
        traffic:   &T,
        v:         VehicleId,
        direction: Direction,
        front:     bool,
    ) -> Option<Neighbor> {
        self.scan(traffic, v, direction, front).into_iter().next()
    }

    pub fn slowest<T: Traffic + ?Sized>(
        &self,
        traffic:   &T,
        v:         VehicleId,
        direction: Direction,
        front:     bool,
    ) -> Option<Neighbor> {
        self.select(traffic, v, direction, front, Selection::Slowest).into_iter().next()
    }

    /// Nearest non-member vehicle straight ahead.
    pub fn leader<T: Traffic + ?Sized>(&self, traffic: &T, v: VehicleId) -> Option<Neighbor> {
        self.closest(traffic, v, Direction::Same, true)
    }

    /// Nearest non-member vehicle straight behind.
    pub fn follower<T: Traffic + ?Sized>(&self, traffic: &T, v: VehicleId) -> Option<Neighbor> {
        self.closest(traffic, v, Direction::Same, false)
    }
}
