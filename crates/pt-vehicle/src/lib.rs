//! `pt-vehicle` — behaviour shared by every platoon member.
//!
//! Leader and follower protocols each own a [`VehicleCore`] and call into it;
//! nothing here knows which role it serves.
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`state`]       | `State`, `Visit` (visited-state metric entry)             |
//! | [`record`]      | `VehicleRecord`, `MetricKey`, `MetricValue`               |
//! | [`kinematics`]  | Safety distances, minimum rear gap, predicted pass time   |
//! | [`event`]       | `ProtocolEvent`, `EventKind`                              |
//! | [`context`]     | `StepContext` — traffic, channel and params for one tick  |
//! | [`vehicle`]     | `VehicleCore` — per-tick prelude and lane-change mechanics |
//!
//! # Per-tick prelude
//!
//! ```text
//! step += 1
//! if in lane change or change-back: update lane-crossing detection
//! record lane (deduplicated) and rounded min/max speed
//! discard inbox, pull deliverable messages from the channel
//! decrement timer if > 0
//! ```
//!
//! The role's state handler runs after the prelude.

pub mod context;
pub mod event;
pub mod kinematics;
pub mod record;
pub mod state;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use context::StepContext;
pub use event::{EventKind, ProtocolEvent};
pub use record::{MetricKey, MetricValue, VehicleRecord};
pub use state::{State, Visit};
pub use vehicle::VehicleCore;
