//! `pt-core` — foundational types for cooperative platoon overtaking.
//!
//! This crate is a dependency of every other `pt-*` crate.  It has no `pt-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`                                           |
//! | [`time`]        | `Tick`, `StepClock`                                   |
//! | [`rng`]         | `SimRng` (seeded channel randomness)                  |
//! | [`direction`]   | `Direction` (relative lane: left / right / same)      |
//! | [`params`]      | `OvertakingParams` — the static configuration object  |
//! | [`error`]       | `PtError`, `PtResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod direction;
pub mod error;
pub mod ids;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use direction::Direction;
pub use error::{PtError, PtResult};
pub use ids::VehicleId;
pub use params::OvertakingParams;
pub use rng::SimRng;
pub use time::{StepClock, Tick};
