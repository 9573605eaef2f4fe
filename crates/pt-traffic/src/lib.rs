//! `pt-traffic` — what the protocol needs to know about the road.
//!
//! The overtaking core never owns vehicle physics.  It queries and commands a
//! traffic simulator through the [`Traffic`] trait, and filters raw neighbour
//! lookups through a [`Radar`] that applies sensor range and hides fellow
//! platoon members.
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`traffic`]   | `Traffic` trait, `Neighbor`                              |
//! | [`radar`]     | `Radar`, `Selection`                                     |
//! | [`snapshot`]  | `TrafficSnapshot`, `VehicleSample` — in-memory `Traffic` |

pub mod radar;
pub mod snapshot;
pub mod traffic;


pub use radar::{Radar, Selection};
pub use snapshot::{TrafficSnapshot, VehicleSample};
pub use traffic::{Neighbor, Traffic};
