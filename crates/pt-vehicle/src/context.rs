//! Borrowed resources an agent needs for one tick.

use pt_c2x::C2x;
use pt_core::OvertakingParams;
use pt_traffic::Traffic;

/// Traffic collaborator, shared channel and configuration, borrowed by the
/// platoon for the duration of one agent tick.
pub struct StepContext<'a, T: Traffic + ?Sized> {
    pub traffic: &'a mut T,
    pub c2x:     &'a mut C2x,
    pub params:  &'a OvertakingParams,
}

impl<'a, T: Traffic + ?Sized> StepContext<'a, T> {
    pub fn new(traffic: &'a mut T, c2x: &'a mut C2x, params: &'a OvertakingParams) -> Self {
        Self { traffic, c2x, params }
    }
}
