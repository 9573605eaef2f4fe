//! `pt-c2x` — the shared inter-vehicle message channel.
//!
//! Every platoon member sends and receives through one [`C2x`] instance owned
//! by the platoon.  Each envelope carries an earliest delivery step; a
//! [`LatencyModel`] decides how many steps a message spends in transit.
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`message`]   | `MessageKind`, `Payload`, `Envelope`                  |
//! | [`latency`]   | `LatencyModel` trait, `NoDelay`, `FixedDelay`, `ExponentialDelay` |
//! | [`channel`]   | `C2x` — pending queue with a delivery-step gate      |
//!
//! # Delivery contract
//!
//! An envelope sent at step `s` with delay `d` becomes visible to
//! `receive(dest, step)` once `step >= s + d`.  It is returned exactly once
//! and removed from the queue; envelopes for one destination come back in
//! send order.

pub mod channel;
pub mod latency;
pub mod message;

#[cfg(test)]
mod tests;

pub use channel::C2x;
pub use latency::{ExponentialDelay, FixedDelay, LatencyModel, NoDelay};
pub use message::{Envelope, MessageKind, Payload};
