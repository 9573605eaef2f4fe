//! Protocol state identifiers.

use std::fmt;

/// Every state either role can be in.
///
/// Leaders and followers dispatch on their own closed state enums; this is
/// the common vocabulary those enums map into for metrics and events.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum State {
    Idle,

    // Leader overtaking states
    VehicleAhead,
    Passing,
    OvertakingComplete,

    // Lane-change states (leader, some shared with the follower)
    AssertOwnAreas,
    RequestSensorData,
    WaitForResponses,
    AssertManeuverArea,
    LaneChangeSafe,
    ChangingLane,
    Abort,
    ChangingBack,
    LaneChangeAborted,
    LaneChangeComplete,

    // Follower-only states
    WaitForDecision,
    InOriginalLane,
    InOvertakingLane,
    LaneChanged,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Idle               => "IDLE",
            State::VehicleAhead       => "VEHICLE_AHEAD",
            State::Passing            => "PASSING",
            State::OvertakingComplete => "OVERTAKING_COMPLETE",
            State::AssertOwnAreas     => "ASSERT_OWN_AREAS",
            State::RequestSensorData  => "REQUEST_SENSOR_DATA",
            State::WaitForResponses   => "WAIT_FOR_RESPONSES",
            State::AssertManeuverArea => "ASSERT_MANEUVER_AREA",
            State::LaneChangeSafe     => "LANE_CHANGE_SAFE",
            State::ChangingLane       => "CHANGING_LANE",
            State::Abort              => "ABORT",
            State::ChangingBack       => "CHANGING_BACK",
            State::LaneChangeAborted  => "LANE_CHANGE_ABORTED",
            State::LaneChangeComplete => "LANE_CHANGE_COMPLETE",
            State::WaitForDecision    => "WAIT_FOR_DECISION",
            State::InOriginalLane     => "IN_ORIGINAL_LANE",
            State::InOvertakingLane   => "IN_OVERTAKING_LANE",
            State::LaneChanged        => "LANE_CHANGED",
        }
    }

    /// States recorded without the `R_` prefix even on the return trip.
    #[inline]
    pub fn is_direction_neutral(self) -> bool {
        matches!(self, State::Passing | State::OvertakingComplete)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the visited-states metric.
///
/// `returning` marks a state entered while maneuvering to the right; it
/// displays as `R_<STATE>`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visit {
    pub state:     State,
    pub returning: bool,
}

impl Visit {
    pub const fn left(state: State) -> Self {
        Self { state, returning: false }
    }

    pub const fn right(state: State) -> Self {
        Self { state, returning: true }
    }
}

impl From<State> for Visit {
    fn from(state: State) -> Self {
        Visit::left(state)
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.returning {
            write!(f, "R_{}", self.state)
        } else {
            write!(f, "{}", self.state)
        }
    }
}
