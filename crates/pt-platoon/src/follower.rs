//! A platoon follower: mirrors the leader's handshake and lane changes.

use pt_c2x::{MessageKind, Payload};
use pt_core::VehicleId;
use pt_traffic::{Radar, Traffic};
use pt_vehicle::{StepContext, VehicleCore};
use tracing::debug;

use crate::role::FollowerState;

/// A member behind the leader; answers its requests and mirrors its lane
/// changes.
pub struct Follower {
    pub(crate) core:   VehicleCore,
    pub(crate) state:  FollowerState,
    pub(crate) leader: VehicleId,
    /// Member directly ahead in the platoon.
    pub(crate) front:  VehicleId,
}

impl Follower {
    /// A follower in IDLE, reporting to `leader` and driving behind `front`.
    pub fn new(id: VehicleId, leader: VehicleId, front: VehicleId, radar: Radar) -> Self {
        Self {
            core: VehicleCore::new(id, radar),
            state: FollowerState::Idle,
            leader,
            front,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.core.id
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    pub fn core(&self) -> &VehicleCore {
        &self.core
    }

    pub fn leader(&self) -> VehicleId {
        self.leader
    }

    pub fn front(&self) -> VehicleId {
        self.front
    }

    fn enter(&mut self, state: FollowerState) {
        self.state = state;
        self.core.set_state(state.into());
    }

    /// Prelude plus exactly one state handler.
    pub fn tick<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.begin_step(ctx);
        match self.state {
            FollowerState::Idle               => self.idle(ctx),
            FollowerState::AssertOwnAreas     => self.assert_own_areas(ctx),
            FollowerState::WaitForDecision    => self.wait_for_decision(),
            FollowerState::ChangingLane       => self.changing_lane(ctx),
            FollowerState::LaneChanged        => self.lane_changed(ctx),
            FollowerState::InOvertakingLane   => self.await_leader_completion(),
            FollowerState::LaneChangeComplete => {
                self.core.lane_change_complete();
                self.enter(FollowerState::Idle);
            }
            FollowerState::Abort              => self.abort(ctx),
            FollowerState::ChangingBack       => self.changing_back(ctx),
            FollowerState::InOriginalLane     => self.in_original_lane(ctx),
        }
    }

    fn reply(&mut self, c2x: &mut pt_c2x::C2x, message: MessageKind, payload: Payload) {
        let leader = self.leader;
        self.core.send(c2x, leader, message, payload);
    }

    fn idle<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let stale_aborts = self.core.take_messages(MessageKind::Abort);
        for env in &stale_aborts {
            debug!(vehicle = %self.core.id, from = %env.source, "abort while idle, acknowledging");
        }
        if !stale_aborts.is_empty() {
            self.reply(ctx.c2x, MessageKind::AbortComplete, Payload::Empty);
        }

        let requests = self.core.take_messages(MessageKind::ReqSensorData);
        if let Some(req) = requests.first() {
            if let Some(direction) = req.payload.direction() {
                self.core.direction = direction;
            }
            self.enter(FollowerState::AssertOwnAreas);
        }
    }

    fn assert_own_areas<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let traffic = &*ctx.traffic;
        let own_area_free =
            self.core.alpha_area_free(traffic, ctx.params) && self.core.beta_area_free(traffic, ctx.params);
        self.reply(ctx.c2x, MessageKind::RespSensorData, Payload::AreaReport { own_area_free });
        self.core.arm_timer(ctx.params);
        self.enter(FollowerState::WaitForDecision);
    }

    fn wait_for_decision(&mut self) {
        if self.core.timer == 0 {
            self.core.timer_expired();
            self.enter(FollowerState::Idle);
            return;
        }
        if !self.core.take_messages(MessageKind::BeginLaneChange).is_empty() {
            self.core.begin_lane_change = true;
            self.enter(FollowerState::ChangingLane);
        }
    }

    /// Leader abort: arm the change-back; `true` if one arrived.
    fn leader_aborted(&mut self) -> bool {
        let aborts = self.core.take_messages(MessageKind::Abort);
        match aborts.first() {
            Some(env) => {
                self.core.request_change_back(format!("Abort from {} received", env.source));
                self.enter(FollowerState::ChangingBack);
                true
            }
            None => false,
        }
    }

    fn changing_lane<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        if self.leader_aborted() {
            return;
        }
        self.core.changing_lane(ctx);
        if !self.core.in_lane_change {
            self.enter(FollowerState::LaneChanged);
        } else if self.core.begin_change_back {
            debug!(vehicle = %self.core.id, reason = %self.core.abort_message, "aborting lane change");
            self.enter(FollowerState::Abort);
        }
    }

    /// Shared by `LaneChanged` and `InOvertakingLane`.
    fn await_leader_completion(&mut self) {
        if self.leader_aborted() {
            return;
        }
        if !self.core.take_messages(MessageKind::LaneChangeComplete).is_empty() {
            self.enter(FollowerState::LaneChangeComplete);
        }
    }

    fn lane_changed<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.await_leader_completion();
        if self.state == FollowerState::LaneChanged {
            self.reply(ctx.c2x, MessageKind::LaneChangeComplete, Payload::Empty);
            self.enter(FollowerState::InOvertakingLane);
        }
    }

    fn abort<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let payload = Payload::Direction(self.core.direction);
        self.reply(ctx.c2x, MessageKind::Abort, payload);
        self.enter(FollowerState::ChangingBack);
    }

    fn changing_back<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.changing_back(ctx);
        if !self.core.in_change_back {
            self.enter(FollowerState::InOriginalLane);
        }
    }

    fn in_original_lane<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.in_new_lane = false;
        self.reply(ctx.c2x, MessageKind::AbortComplete, Payload::Empty);
        self.enter(FollowerState::Idle);
    }
}
