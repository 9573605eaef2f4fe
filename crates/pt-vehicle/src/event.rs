//! Structured protocol events.
//!
//! Agents append events to a buffer during their tick; the platoon drains it
//! and hands each event to its observer.

use std::fmt;

use pt_c2x::MessageKind;
use pt_core::{Tick, VehicleId};

use crate::state::{State, Visit};

#[derive(Clone, Debug, PartialEq)]
pub struct ProtocolEvent {
    pub vehicle: VehicleId,
    pub step:    Tick,
    pub kind:    EventKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    StateChanged { visit: Visit },
    MessageSent { to: VehicleId, message: MessageKind },
    /// A reply-waiting state ran out of time.
    TimerExpired { state: State },
    AbortRequested { reason: String },
    /// A reply from a member that was not outstanding.
    UnexpectedReply { from: VehicleId, message: MessageKind },
    LaneChangeStarted { from_lane: i32, to_lane: i32, lateral: f64 },
    /// Seconds from the overtaking decision to entering the passing lane.
    OvertakingTimed { secs: f64 },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::StateChanged { .. }      => "state_changed",
            EventKind::MessageSent { .. }       => "message_sent",
            EventKind::TimerExpired { .. }      => "timer_expired",
            EventKind::AbortRequested { .. }    => "abort_requested",
            EventKind::UnexpectedReply { .. }   => "unexpected_reply",
            EventKind::LaneChangeStarted { .. } => "lane_change_started",
            EventKind::OvertakingTimed { .. }   => "overtaking_timed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::StateChanged { visit } => write!(f, "{visit}"),
            EventKind::MessageSent { to, message } => write!(f, "{message} -> {to}"),
            EventKind::TimerExpired { state } => write!(f, "timer expired in {state}"),
            EventKind::AbortRequested { reason } => f.write_str(reason),
            EventKind::UnexpectedReply { from, message } => {
                write!(f, "{message} from {from} not awaited")
            }
            EventKind::LaneChangeStarted { from_lane, to_lane, lateral } => {
                write!(f, "lane {from_lane} -> {to_lane} (lat={lateral:.2})")
            }
            EventKind::OvertakingTimed { secs } => write!(f, "{secs:.2} s"),
        }
    }
}
