//! Message vocabulary of the overtaking handshake.

use std::fmt;

use pt_core::{Direction, Tick, VehicleId};

/// What a message asks for or reports.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// Leader → follower: evaluate your own areas for a maneuver.
    ReqSensorData,
    /// Follower → leader: answer to `ReqSensorData`.
    RespSensorData,
    /// Leader → follower: start the lane change now.
    BeginLaneChange,
    /// Both ways: the local lane change is finished.
    LaneChangeComplete,
    /// Both ways: abandon the lane change and return.
    Abort,
    /// Follower → leader: change-back finished.
    AbortComplete,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::ReqSensorData      => "REQ_SENSOR_DATA",
            MessageKind::RespSensorData     => "RESP_SENSOR_DATA",
            MessageKind::BeginLaneChange    => "BEGIN_LANE_CHANGE",
            MessageKind::LaneChangeComplete => "LANE_CHANGE_COMPLETE",
            MessageKind::Abort              => "ABORT",
            MessageKind::AbortComplete      => "ABORT_COMPLETE",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured body of a message.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    #[default]
    Empty,
    /// Maneuver direction the message refers to.
    Direction(Direction),
    /// A follower's verdict on its own front and rear areas.
    AreaReport { own_area_free: bool },
}

impl Payload {
    /// The carried direction, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Payload::Direction(d) => Some(*d),
            _ => None,
        }
    }

    /// The carried area verdict, if any.
    pub fn own_area_free(&self) -> Option<bool> {
        match self {
            Payload::AreaReport { own_area_free } => Some(*own_area_free),
            _ => None,
        }
    }
}

/// A message in transit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// Sequence number assigned by the channel at send time.
    pub id:          u64,
    pub source:      VehicleId,
    pub destination: VehicleId,
    pub kind:        MessageKind,
    pub payload:     Payload,
    /// Not visible to `receive` before this step.
    pub deliver_at:  Tick,
}

impl Envelope {
    /// Whether `receive(dest, step)` may hand out this envelope.
    #[inline]
    pub fn is_deliverable(&self, dest: VehicleId, step: Tick) -> bool {
        self.destination == dest && self.deliver_at <= step
    }
}
