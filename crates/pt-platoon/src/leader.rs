//! The platoon leader: overtaking decision, follower handshake, backoff.

use pt_c2x::{MessageKind, Payload};
use pt_core::{Direction, OvertakingParams, VehicleId};
use pt_traffic::{Neighbor, Radar, Traffic};
use pt_vehicle::kinematics::{self, PassGeometry};
use pt_vehicle::{StepContext, VehicleCore};
use tracing::debug;

use crate::role::LeaderState;

/// An obstacle judged worth overtaking, with the numbers behind the verdict.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassCandidate {
    pub obstacle:   VehicleId,
    /// Speed reachable on the passing lane.
    pub v_max_lane: f64,
    pub v_obstacle: f64,
    pub distance:   f64,
    /// Predicted seconds to complete the pass.
    pub ot_time:    f64,
}

impl PassCandidate {
    /// Whether passing this obstacle is useful.
    ///
    /// The speed and time thresholds are tightened by the oscillation margin
    /// while facing left outside a lane change, or facing right during one.
    /// The distance cap of `factor_safety_distance · safety_dist` only
    /// applies when facing left.
    pub fn is_useful(
        &self,
        direction:      Direction,
        in_lane_change: bool,
        safety_dist:    f64,
        params:         &OvertakingParams,
    ) -> bool {
        let mut speed_threshold = params.min_overtaking_speed_delta;
        let mut time_threshold = params.max_overtaking_time;
        if (direction == Direction::Left && !in_lane_change)
            || (direction == Direction::Right && in_lane_change)
        {
            speed_threshold = params.min_overtaking_speed_delta * (1.0 + params.oscillation_mod);
            time_threshold = params.max_overtaking_time * (1.0 - params.oscillation_mod);
        }
        self.v_max_lane - self.v_obstacle >= speed_threshold
            && self.ot_time <= time_threshold
            && (self.distance < params.factor_safety_distance * safety_dist
                || direction == Direction::Right)
    }
}

/// The front member: decides when to overtake and coordinates every lane
/// change with its followers over the channel.
pub struct Leader {
    pub(crate) core:                VehicleCore,
    pub(crate) state:               LeaderState,
    /// Follower ids, front to back.
    pub(crate) followers:           Vec<VehicleId>,
    /// Backoff exponent in `[min_backoff, max_backoff]`.
    pub(crate) backoff:             u32,
    pub(crate) desired_speed:       f64,
    /// Followers whose reply is still outstanding.
    pub(crate) waiting_for_reply:   Vec<VehicleId>,
    /// Area verdicts reported by followers this round.
    pub(crate) safety_data:         Vec<bool>,
    pub(crate) ot_predicted:        f64,
    /// Simulation time (s) of the overtaking decision.
    pub(crate) ot_started:          Option<f64>,
    /// Consecutive lane-change ticks with a hazardous obstacle verdict.
    pub(crate) detection_threshold: u32,
}

impl Leader {
    /// A leader in IDLE with the backoff exponent at `min_backoff`.
    pub fn new(
        id:            VehicleId,
        followers:     Vec<VehicleId>,
        desired_speed: f64,
        radar:         Radar,
        params:        &OvertakingParams,
    ) -> Self {
        Self {
            core: VehicleCore::new(id, radar),
            state: LeaderState::Idle,
            followers,
            backoff: params.min_backoff,
            desired_speed,
            waiting_for_reply: Vec::new(),
            safety_data: Vec::new(),
            ot_predicted: 0.0,
            ot_started: None,
            detection_threshold: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> VehicleId {
        self.core.id
    }

    pub fn state(&self) -> LeaderState {
        self.state
    }

    pub fn core(&self) -> &VehicleCore {
        &self.core
    }

    pub fn followers(&self) -> &[VehicleId] {
        &self.followers
    }

    pub fn backoff(&self) -> u32 {
        self.backoff
    }

    pub fn desired_speed(&self) -> f64 {
        self.desired_speed
    }

    pub fn waiting_for_reply(&self) -> &[VehicleId] {
        &self.waiting_for_reply
    }

    pub fn ot_predicted(&self) -> f64 {
        self.ot_predicted
    }

    pub fn detection_threshold(&self) -> u32 {
        self.detection_threshold
    }

    fn enter(&mut self, state: LeaderState) {
        self.state = state;
        self.core.set_state(state.into());
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Prelude plus exactly one state handler.
    pub fn tick<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.begin_step(ctx);
        match self.state {
            LeaderState::Idle               => self.idle(ctx),
            LeaderState::VehicleAhead       => self.vehicle_ahead(ctx),
            LeaderState::Passing            => self.passing(ctx),
            LeaderState::OvertakingComplete => self.enter(LeaderState::Idle),
            LeaderState::AssertOwnAreas     => self.assert_own_areas(ctx),
            LeaderState::RequestSensorData  => self.request_sensor_data(ctx),
            LeaderState::WaitForResponses   => self.wait_for_responses(),
            LeaderState::AssertManeuverArea => self.assert_maneuver_area(),
            LeaderState::LaneChangeAborted  => self.lane_change_aborted(ctx.params),
            LeaderState::LaneChangeSafe     => self.lane_change_safe(ctx),
            LeaderState::ChangingLane       => self.changing_lane(ctx),
            LeaderState::LaneChangeComplete => self.lane_change_complete(ctx),
            LeaderState::Abort              => self.abort(ctx),
            LeaderState::ChangingBack       => self.changing_back(ctx),
        }
    }

    // ── Geometry & decision ───────────────────────────────────────────────

    /// Leader front bumper to the last follower's rear bumper.
    pub fn platoon_length<T: Traffic + ?Sized>(&self, traffic: &T) -> f64 {
        let id = self.core.id;
        match self.followers.last() {
            Some(&last) => traffic.x_position(id) - traffic.x_position(last) + traffic.length(last),
            None => traffic.length(id),
        }
    }

    /// Speed the platoon can drive while passing.
    pub fn lane_speed<T: Traffic + ?Sized>(&self, traffic: &T) -> f64 {
        self.desired_speed.min(traffic.lane_max_speed(self.core.id))
    }

    fn pass_geometry<T: Traffic + ?Sized>(&self, traffic: &T, params: &OvertakingParams) -> PassGeometry {
        let id = self.core.id;
        PassGeometry {
            speed:                     traffic.speed(id),
            max_accel:                 traffic.max_accel(id),
            max_lateral_speed:         traffic.max_lateral_speed(id),
            distance_to_original_lane: traffic.distance_to_original_lane(id),
            platoon_length:            self.platoon_length(traffic),
            safety_dist:               self.core.safety_dist_platoon(traffic, params),
            direction:                 self.core.direction,
        }
    }

    /// First obstacle among `obstacles` that is worth overtaking.
    pub fn should_overtake<T: Traffic + ?Sized>(
        &self,
        traffic:   &T,
        params:    &OvertakingParams,
        obstacles: &[Neighbor],
    ) -> Option<PassCandidate> {
        if obstacles.is_empty() {
            return None;
        }
        let v_max_lane = self.lane_speed(traffic);
        let geo = self.pass_geometry(traffic, params);
        obstacles.iter().find_map(|n| {
            let v_obstacle = traffic.speed(n.id);
            let ot_time =
                kinematics::predicted_overtaking_time(&geo, v_max_lane, v_obstacle, n.distance, params);
            let candidate = PassCandidate {
                obstacle: n.id,
                v_max_lane,
                v_obstacle,
                distance: n.distance,
                ot_time,
            };
            let useful =
                candidate.is_useful(geo.direction, self.core.in_lane_change, geo.safety_dist, params);
            debug!(
                vehicle = %self.core.id, obstacle = %n.id, v_max_lane, v_obstacle,
                distance = n.distance, ot_time, useful, "overtaking assessment"
            );
            useful.then_some(candidate)
        })
    }

    fn set_backoff_timer(&mut self, params: &OvertakingParams) {
        self.core.set_timer(2u32.saturating_pow(self.backoff));
        if self.backoff < params.max_backoff {
            self.backoff += 1;
        }
    }

    /// Drop `from` from the outstanding set; `false` if it was not there.
    fn stop_waiting_for(&mut self, from: VehicleId) -> bool {
        match self.waiting_for_reply.iter().position(|v| *v == from) {
            Some(i) => {
                self.waiting_for_reply.remove(i);
                true
            }
            None => false,
        }
    }

    fn broadcast(&mut self, c2x: &mut pt_c2x::C2x, message: MessageKind, payload: Payload, await_reply: bool) {
        for &f in &self.followers {
            self.core.send(c2x, f, message, payload);
            if await_reply {
                self.waiting_for_reply.push(f);
            }
        }
    }

    // ── Overtaking states ─────────────────────────────────────────────────

    fn idle<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.safety_data.clear();
        self.core.clear_inbox();
        if let Some(ahead) = self.core.radar().leader(&*ctx.traffic, self.core.id) {
            self.core.direction = Direction::Left;
            self.core.timer = 0;
            debug!(vehicle = %self.core.id, obstacle = %ahead.id, distance = ahead.distance, "vehicle detected");
            self.enter(LeaderState::VehicleAhead);
        }
    }

    fn vehicle_ahead<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let traffic = &*ctx.traffic;
        let ahead = self.core.radar().scan(traffic, self.core.id, Direction::Same, true);
        if ahead.is_empty() {
            debug!(vehicle = %self.core.id, "vehicle ahead out of range");
            self.ot_started = None;
            self.enter(LeaderState::Idle);
            return;
        }
        if self.core.timer > 0 {
            return;
        }
        if let Some(candidate) = self.should_overtake(traffic, ctx.params, &ahead) {
            self.ot_predicted = candidate.ot_time;
            if self.core.direction == Direction::Left && self.ot_started.is_none() {
                self.ot_started = Some(traffic.time_secs());
            }
            self.enter(LeaderState::AssertOwnAreas);
        }
    }

    fn passing<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let traffic = &*ctx.traffic;
        if let Some(started) = self.ot_started.take() {
            self.core.record_overtaking_time(traffic.time_secs() - started);
        }
        if self.core.timer > 0 {
            return;
        }
        let front_right = self.core.radar().scan(traffic, self.core.id, Direction::Right, true);
        if self.should_overtake(traffic, ctx.params, &front_right).is_none() {
            debug!(vehicle = %self.core.id, "changing back is useful");
            self.enter(LeaderState::AssertOwnAreas);
        }
    }

    // ── Lane-change states ────────────────────────────────────────────────

    fn assert_own_areas<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let traffic = &*ctx.traffic;
        if self.core.alpha_area_free(traffic, ctx.params) && self.core.beta_area_free(traffic, ctx.params) {
            self.enter(LeaderState::RequestSensorData);
        } else {
            debug!(vehicle = %self.core.id, direction = %self.core.direction, "own areas occupied");
            self.enter(LeaderState::LaneChangeAborted);
        }
    }

    fn request_sensor_data<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let payload = Payload::Direction(self.core.direction);
        self.broadcast(ctx.c2x, MessageKind::ReqSensorData, payload, true);
        self.core.arm_timer(ctx.params);
        self.enter(LeaderState::WaitForResponses);
    }

    fn wait_for_responses(&mut self) {
        if self.core.timer == 0 {
            self.waiting_for_reply.clear();
            self.core.timer_expired();
            self.enter(LeaderState::LaneChangeAborted);
            return;
        }
        for env in self.core.take_messages(MessageKind::RespSensorData) {
            if self.stop_waiting_for(env.source) {
                self.safety_data.push(env.payload.own_area_free().unwrap_or(false));
            } else {
                self.core.unexpected_reply(env.source, env.kind);
            }
        }
        if self.waiting_for_reply.is_empty() {
            self.enter(LeaderState::AssertManeuverArea);
        }
    }

    fn assert_maneuver_area(&mut self) {
        let mut is_safe = true;
        for own_area_free in self.safety_data.drain(..) {
            is_safe &= own_area_free;
        }
        if is_safe {
            self.enter(LeaderState::LaneChangeSafe);
        } else {
            debug!(vehicle = %self.core.id, "lane change unsafe");
            self.enter(LeaderState::LaneChangeAborted);
        }
    }

    fn lane_change_aborted(&mut self, params: &OvertakingParams) {
        self.core.in_new_lane = false;
        if self.core.direction == Direction::Left {
            self.ot_predicted = 0.0;
            self.set_backoff_timer(params);
            self.enter(LeaderState::VehicleAhead);
        } else {
            self.core.arm_timer(params);
            self.enter(LeaderState::Passing);
        }
    }

    fn lane_change_safe<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.backoff = ctx.params.min_backoff;
        self.waiting_for_reply.clear();
        let payload = Payload::Direction(self.core.direction);
        self.broadcast(ctx.c2x, MessageKind::BeginLaneChange, payload, true);
        self.core.begin_lane_change = true;
        self.detection_threshold = 0;
        self.enter(LeaderState::ChangingLane);
    }

    fn handle_abort(&mut self) {
        self.waiting_for_reply.clear();
        debug!(vehicle = %self.core.id, reason = %self.core.abort_message, "aborting lane change");
        self.enter(LeaderState::Abort);
    }

    fn changing_lane<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let aborts = self.core.take_messages(MessageKind::Abort);
        if let Some(from) = aborts.first().map(|env| env.source) {
            self.core.request_change_back(format!("Abort from {from} received"));
            self.handle_abort();
            return;
        }

        self.core.changing_lane(ctx);

        for env in self.core.take_messages(MessageKind::LaneChangeComplete) {
            if !self.stop_waiting_for(env.source) {
                self.core.unexpected_reply(env.source, env.kind);
            }
        }

        if self.core.in_lane_change {
            self.watch_obstacle(&*ctx.traffic, ctx.params);
            if self.core.begin_change_back {
                self.handle_abort();
            }
        } else if self.waiting_for_reply.is_empty() {
            self.enter(LeaderState::LaneChangeComplete);
        }
    }

    /// Debounced re-check of the obstacle during a lane change.
    ///
    /// Moving left, the obstacle must stay worth overtaking; moving right, no
    /// obstacle may become worth overtaking.  A hazardous verdict on more than
    /// `max_not_detected` consecutive ticks requests a change-back.
    fn watch_obstacle<T: Traffic + ?Sized>(&mut self, traffic: &T, params: &OvertakingParams) {
        let id = self.core.id;
        let going_left = self.core.direction == Direction::Left;
        let watch = match (going_left, self.core.in_new_lane) {
            (true, true) | (false, false) => Direction::Right,
            (true, false) | (false, true) => Direction::Same,
        };
        let obstacles = self.core.radar().scan(traffic, id, watch, true);
        let useful = self.should_overtake(traffic, params, &obstacles).is_some();
        let hazard = if going_left { !useful } else { useful };

        if !hazard {
            self.detection_threshold = 0;
            return;
        }
        self.detection_threshold += 1;
        if self.detection_threshold > params.max_not_detected {
            let reason = match (going_left, obstacles.first()) {
                (true, None) => "Slower vehicle out of range".to_string(),
                (true, Some(n)) => format!("Overtaking of {} not useful or possible anymore", n.id),
                (false, Some(n)) => format!("Overtaking of {} useful and possible", n.id),
                (false, None) => "Slower vehicle appeared".to_string(),
            };
            self.core.request_change_back(reason);
        }
    }

    fn lane_change_complete<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.lane_change_complete();
        self.safety_data.clear();
        self.core.timer = 0;
        self.broadcast(ctx.c2x, MessageKind::LaneChangeComplete, Payload::Empty, false);
        if self.core.direction == Direction::Right {
            self.enter(LeaderState::Passing);
        } else {
            self.ot_predicted = 0.0;
            self.enter(LeaderState::OvertakingComplete);
        }
    }

    fn abort<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let payload = Payload::Direction(self.core.direction);
        self.broadcast(ctx.c2x, MessageKind::Abort, payload, true);
        self.enter(LeaderState::ChangingBack);
    }

    fn changing_back<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.core.changing_back(ctx);
        for env in self.core.take_messages(MessageKind::AbortComplete) {
            if !self.stop_waiting_for(env.source) {
                self.core.unexpected_reply(env.source, env.kind);
            }
        }
        if !self.core.in_change_back && self.waiting_for_reply.is_empty() {
            self.enter(LeaderState::LaneChangeAborted);
        }
    }
}
