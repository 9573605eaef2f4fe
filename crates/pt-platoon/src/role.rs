//! Closed state sets of the two roles.

use std::fmt;

use pt_vehicle::State;

/// States of the leader's decision and lane-change machine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LeaderState {
    Idle,
    VehicleAhead,
    AssertOwnAreas,
    RequestSensorData,
    WaitForResponses,
    AssertManeuverArea,
    LaneChangeSafe,
    ChangingLane,
    LaneChangeComplete,
    LaneChangeAborted,
    Abort,
    ChangingBack,
    Passing,
    OvertakingComplete,
}

impl From<LeaderState> for State {
    fn from(s: LeaderState) -> State {
        match s {
            LeaderState::Idle               => State::Idle,
            LeaderState::VehicleAhead       => State::VehicleAhead,
            LeaderState::AssertOwnAreas     => State::AssertOwnAreas,
            LeaderState::RequestSensorData  => State::RequestSensorData,
            LeaderState::WaitForResponses   => State::WaitForResponses,
            LeaderState::AssertManeuverArea => State::AssertManeuverArea,
            LeaderState::LaneChangeSafe     => State::LaneChangeSafe,
            LeaderState::ChangingLane       => State::ChangingLane,
            LeaderState::LaneChangeComplete => State::LaneChangeComplete,
            LeaderState::LaneChangeAborted  => State::LaneChangeAborted,
            LeaderState::Abort              => State::Abort,
            LeaderState::ChangingBack       => State::ChangingBack,
            LeaderState::Passing            => State::Passing,
            LeaderState::OvertakingComplete => State::OvertakingComplete,
        }
    }
}

impl fmt::Display for LeaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&State::from(*self), f)
    }
}

/// States of the follower's reactive mirror.
///
/// `InOvertakingLane` behaves exactly like `LaneChanged`; it only marks that
/// completion was already acknowledged.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FollowerState {
    Idle,
    AssertOwnAreas,
    WaitForDecision,
    ChangingLane,
    LaneChanged,
    InOvertakingLane,
    LaneChangeComplete,
    Abort,
    ChangingBack,
    InOriginalLane,
}

impl From<FollowerState> for State {
    fn from(s: FollowerState) -> State {
        match s {
            FollowerState::Idle               => State::Idle,
            FollowerState::AssertOwnAreas     => State::AssertOwnAreas,
            FollowerState::WaitForDecision    => State::WaitForDecision,
            FollowerState::ChangingLane       => State::ChangingLane,
            FollowerState::LaneChanged        => State::LaneChanged,
            FollowerState::InOvertakingLane   => State::InOvertakingLane,
            FollowerState::LaneChangeComplete => State::LaneChangeComplete,
            FollowerState::Abort              => State::Abort,
            FollowerState::ChangingBack       => State::ChangingBack,
            FollowerState::InOriginalLane     => State::InOriginalLane,
        }
    }
}

impl fmt::Display for FollowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&State::from(*self), f)
    }
}
