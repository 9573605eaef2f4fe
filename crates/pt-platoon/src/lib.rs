//! `pt-platoon` — cooperative overtaking for a convoy of vehicles.
//!
//! # Tick loop
//!
//! ```text
//! Platoon::tick(traffic, observer):
//!   ① if the leader is in OVERTAKING_COMPLETE: did_overtake = true
//!   ② leader.tick    — prelude, then one leader state handler
//!   ③ for each follower, front to back:
//!        follower.tick — prelude, then one follower state handler
//!   after every agent: drain its ProtocolEvents into the observer
//! ```
//!
//! A transition chosen by a handler takes effect on the agent's next tick.
//! Messages travel through the platoon's one [`pt_c2x::C2x`] channel.
//!
//! | Module        | Contents                                           |
//! |---------------|----------------------------------------------------|
//! | [`role`]      | `LeaderState`, `FollowerState`                     |
//! | [`leader`]    | `Leader`, `PassCandidate`                          |
//! | [`follower`]  | `Follower`                                         |
//! | [`platoon`]   | `Platoon`                                          |
//! | [`builder`]   | `PlatoonBuilder`, `Formation`, `Slot`              |
//! | [`observer`]  | `PlatoonObserver`, `NoopObserver`, `EventLog`      |
//! | [`error`]     | `PlatoonError`, `PlatoonResult`                    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let (mut platoon, formation) = PlatoonBuilder::new(OvertakingParams::default())
//!     .members(3)
//!     .desired_speed(30.55)
//!     .build()?;
//! // insert formation.slots into the traffic simulator, then per step:
//! platoon.tick(&mut traffic, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod follower;
pub mod leader;
pub mod observer;
pub mod platoon;
pub mod role;


pub use builder::{Formation, PlatoonBuilder, Slot};
pub use error::{PlatoonError, PlatoonResult};
pub use follower::Follower;
pub use leader::{Leader, PassCandidate};
pub use observer::{EventLog, NoopObserver, PlatoonObserver};
pub use platoon::Platoon;
pub use role::{FollowerState, LeaderState};
