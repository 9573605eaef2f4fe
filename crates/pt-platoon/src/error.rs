use pt_core::PtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatoonError {
    #[error("a platoon needs at least one member")]
    EmptyPlatoon,

    #[error("member id {first} + {count} overflows the id space")]
    IdOverflow { first: u32, count: usize },

    #[error(transparent)]
    Core(#[from] PtError),
}

pub type PlatoonResult<T> = Result<T, PlatoonError>;
