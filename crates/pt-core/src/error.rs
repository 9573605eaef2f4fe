//! Framework error type.
//!
//! The protocol itself never fails at runtime; the only fatal condition is a
//! configuration that cannot be used, reported once at construction.

use thiserror::Error;

use crate::VehicleId;

/// The top-level error type for `pt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum PtError {
    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `pt-*` crates.
pub type PtResult<T> = Result<T, PtError>;
