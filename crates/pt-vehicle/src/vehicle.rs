//! `VehicleCore` — the record and mechanics every platoon member shares.

use pt_c2x::{C2x, Envelope, MessageKind, Payload};
use pt_core::{Direction, OvertakingParams, Tick, VehicleId};
use pt_traffic::{Neighbor, Radar, Traffic};
use tracing::{debug, info, trace};

use crate::context::StepContext;
use crate::event::{EventKind, ProtocolEvent};
use crate::kinematics;
use crate::record::VehicleRecord;
use crate::state::State;

/// Shared state of one platoon member.
///
/// The maneuver flags and lane bookkeeping are public so role state machines
/// can drive them directly; the record, inbox and event buffer are only
/// reachable through methods that keep them append-only.
pub struct VehicleCore {
    pub id:                    VehicleId,
    /// Local step counter, advanced once per tick.
    pub step:                  Tick,
    /// Ticks left before a timeout; `0` means expired or inactive.
    pub timer:                 u32,
    pub direction:             Direction,
    pub in_lane_change:        bool,
    pub begin_lane_change:     bool,
    pub in_change_back:        bool,
    pub begin_change_back:     bool,
    /// Past the lane marking during the current maneuver.
    pub in_new_lane:           bool,
    pub lane_offset_last_step: f64,
    pub lc_from:               i32,
    pub lc_to:                 i32,
    /// Reason of the last requested change-back.
    pub abort_message:         String,

    state:  State,
    inbox:  Vec<Envelope>,
    record: VehicleRecord,
    events: Vec<ProtocolEvent>,
    radar:  Radar,
}

impl VehicleCore {
    /// A member in IDLE, facing left, with the initial state recorded.  No
    /// event is emitted for the initial state.
    pub fn new(id: VehicleId, radar: Radar) -> Self {
        let mut core = Self {
            id,
            step:                  Tick::ZERO,
            timer:                 0,
            direction:             Direction::Left,
            in_lane_change:        false,
            begin_lane_change:     false,
            in_change_back:        false,
            begin_change_back:     false,
            in_new_lane:           false,
            lane_offset_last_step: 0.0,
            lc_from:               0,
            lc_to:                 0,
            abort_message:         String::new(),
            state:                 State::Idle,
            inbox:                 Vec::new(),
            record:                VehicleRecord::default(),
            events:                Vec::new(),
            radar,
        };
        core.record.push_state(State::Idle, Direction::Left);
        core
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    pub fn record(&self) -> &VehicleRecord {
        &self.record
    }

    pub fn radar(&self) -> &Radar {
        &self.radar
    }

    /// Messages received this tick and not yet consumed.
    pub fn inbox(&self) -> &[Envelope] {
        &self.inbox
    }

    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, kind: EventKind) {
        self.events.push(ProtocolEvent { vehicle: self.id, step: self.step, kind });
    }

    // ── Per-tick prelude ──────────────────────────────────────────────────

    /// Advance the step counter, update crossing detection and metrics,
    /// refill the inbox and count the timer down.
    pub fn begin_step<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        self.step = self.step.next();
        if self.in_lane_change || self.in_change_back {
            self.detect_lane_crossing(&*ctx.traffic, ctx.params);
        }
        self.record_kinematics(&*ctx.traffic);

        self.inbox.clear();
        self.inbox.extend(ctx.c2x.receive(self.id, self.step));
        for env in &self.inbox {
            trace!(vehicle = %self.id, step = self.step.0, from = %env.source, kind = %env.kind, "message in inbox");
        }
        self.decrement_timer();
    }

    /// A sign flip of the lateral offset beyond `lane_offset_min` means the
    /// lane marking was crossed.
    pub fn detect_lane_crossing<T: Traffic + ?Sized>(&mut self, traffic: &T, params: &OvertakingParams) {
        let current = traffic.lateral_offset(self.id);
        if current.abs() > params.lane_offset_min && self.lane_offset_last_step * current < 0.0 {
            self.in_new_lane = true;
        }
        self.lane_offset_last_step = current;
    }

    pub fn record_kinematics<T: Traffic + ?Sized>(&mut self, traffic: &T) {
        self.record.push_lane(traffic.lane_index(self.id));
        self.record.observe_speed(traffic.speed(self.id));
    }

    #[inline]
    pub fn decrement_timer(&mut self) {
        self.timer = self.timer.saturating_sub(1);
    }

    // ── State, timer, diagnostics ─────────────────────────────────────────

    /// Switch state and append it to the visited-states record.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
        let visit = self.record.push_state(state, self.direction);
        debug!(vehicle = %self.id, step = self.step.0, state = %visit, "switching state");
        self.emit(EventKind::StateChanged { visit });
    }

    pub fn set_timer(&mut self, ticks: u32) {
        self.timer = ticks;
        trace!(vehicle = %self.id, step = self.step.0, ticks, "timer set");
    }

    /// Arm the standard reply timeout.
    pub fn arm_timer(&mut self, params: &OvertakingParams) {
        self.set_timer(params.max_timer);
    }

    /// Report that the current waiting state timed out.
    pub fn timer_expired(&mut self) {
        debug!(vehicle = %self.id, step = self.step.0, state = %self.state, "timer expired");
        self.emit(EventKind::TimerExpired { state: self.state });
    }

    /// Flag a change-back for the next lane-change handler.
    pub fn request_change_back(&mut self, reason: impl Into<String>) {
        self.begin_change_back = true;
        self.abort_message = reason.into();
        info!(vehicle = %self.id, step = self.step.0, reason = %self.abort_message, "change-back requested");
        self.emit(EventKind::AbortRequested { reason: self.abort_message.clone() });
    }

    /// Note a reply from a member nobody was waiting for.
    pub fn unexpected_reply(&mut self, from: VehicleId, message: MessageKind) {
        debug!(vehicle = %self.id, step = self.step.0, %from, %message, "reply not awaited, ignored");
        self.emit(EventKind::UnexpectedReply { from, message });
    }

    pub fn record_overtaking_time(&mut self, secs: f64) {
        info!(vehicle = %self.id, step = self.step.0, secs, "overtaking timed");
        self.record.ot_times.push(secs);
        self.emit(EventKind::OvertakingTimed { secs });
    }

    // ── Messaging ─────────────────────────────────────────────────────────

    pub fn send(&mut self, c2x: &mut C2x, to: VehicleId, message: MessageKind, payload: Payload) {
        c2x.send(self.id, to, message, payload, self.step);
        debug!(vehicle = %self.id, step = self.step.0, %to, %message, "message sent");
        self.emit(EventKind::MessageSent { to, message });
    }

    /// Remove and return all inbox messages of `kind`, oldest first.
    pub fn take_messages(&mut self, kind: MessageKind) -> Vec<Envelope> {
        let (taken, kept): (Vec<Envelope>, Vec<Envelope>) =
            self.inbox.drain(..).partition(|env| env.kind == kind);
        self.inbox = kept;
        taken
    }

    pub fn clear_inbox(&mut self) {
        self.inbox.clear();
    }

    // ── Area safety ───────────────────────────────────────────────────────

    pub fn safety_dist_platoon<T: Traffic + ?Sized>(&self, traffic: &T, params: &OvertakingParams) -> f64 {
        kinematics::safety_dist_platoon(
            traffic.time_headway(self.id),
            traffic.speed(self.id),
            self.in_lane_change,
            params,
        )
    }

    /// Minimum gap to `rear` so that it brakes at most with `accel`.
    pub fn d_min<T: Traffic + ?Sized>(
        &self,
        accel:   f64,
        rear:    &Neighbor,
        traffic: &T,
        params:  &OvertakingParams,
    ) -> f64 {
        kinematics::min_rear_gap(
            accel,
            traffic.speed(self.id),
            traffic.speed(rear.id),
            self.direction,
            self.in_lane_change,
            params,
        )
    }

    /// Front area in the maneuver direction (straight ahead once past the
    /// marking) is free of vehicles closer than the safety distance.
    pub fn alpha_area_free<T: Traffic + ?Sized>(&self, traffic: &T, params: &OvertakingParams) -> bool {
        let neighbor = if self.in_lane_change && self.in_new_lane {
            self.radar.leader(traffic, self.id)
        } else {
            self.radar.closest(traffic, self.id, self.direction, true)
        };
        let Some(n) = neighbor else {
            return true;
        };
        let safety = self.safety_dist_platoon(traffic, params);
        let free = n.distance >= safety;
        trace!(
            vehicle = %self.id, side = %self.direction.short(),
            other = %n.id, distance = n.distance, safety, free, "front area"
        );
        free
    }

    /// Rear area in the maneuver direction (straight behind once past the
    /// marking) leaves the rear vehicle at least `d_min`.
    pub fn beta_area_free<T: Traffic + ?Sized>(&self, traffic: &T, params: &OvertakingParams) -> bool {
        let accel = if self.in_lane_change {
            params.max_accel_rear_abort
        } else if self.direction == Direction::Left {
            params.max_accel_vehicle_left
        } else {
            params.max_accel_vehicle_right
        };
        let neighbor = if self.in_lane_change && self.in_new_lane {
            self.radar.follower(traffic, self.id)
        } else {
            self.radar.closest(traffic, self.id, self.direction, false)
        };
        let Some(n) = neighbor else {
            return true;
        };
        let min_dist = self.d_min(accel, &n, traffic, params);
        let free = n.distance >= min_dist;
        trace!(
            vehicle = %self.id, side = %self.direction.short(),
            other = %n.id, distance = n.distance, min_dist, accel, free, "rear area"
        );
        free
    }

    /// The member directly ahead or behind in the platoon diverges laterally
    /// by more than `member_max_offset`.
    pub fn member_not_following<T: Traffic + ?Sized>(&self, traffic: &T, params: &OvertakingParams) -> bool {
        let members = self.radar.members();
        let Some(idx) = members.iter().position(|m| *m == self.id) else {
            return false;
        };
        let own = traffic.lateral_offset(self.id).abs();
        let diverges = |other: VehicleId| {
            (own - traffic.lateral_offset(other).abs()).abs() > params.member_max_offset
        };
        if idx > 0 && diverges(members[idx - 1]) {
            return true;
        }
        match members.get(idx + 1) {
            Some(&rear) => diverges(rear),
            None => false,
        }
    }

    // ── Lane-change mechanics ─────────────────────────────────────────────

    /// Command the lateral move toward the target lane centre, or to the
    /// centre of the current lane once past the marking.
    pub fn exec_lane_change<T: Traffic + ?Sized>(&mut self, traffic: &mut T, params: &OvertakingParams) {
        let offset = traffic.lateral_offset(self.id);
        let lateral = if self.in_new_lane {
            -offset
        } else if self.direction == Direction::Left {
            params.lane_width - offset
        } else {
            -(params.lane_width + offset)
        };
        traffic.change_sublane(self.id, lateral);
        debug!(
            vehicle = %self.id, step = self.step.0,
            from = self.lc_from, to = self.lc_to, lateral, "lane change started"
        );
        self.emit(EventKind::LaneChangeStarted {
            from_lane: self.lc_from,
            to_lane:   self.lc_to,
            lateral,
        });
    }

    /// Start the lane change on the tick the begin flag is set, then watch
    /// for hazards until centred in the target lane.
    pub fn changing_lane<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let id = self.id;
        if self.begin_lane_change {
            self.begin_lane_change = false;
            self.in_lane_change = true;
            self.in_change_back = false;
            self.in_new_lane = false;
            self.lane_offset_last_step = ctx.traffic.lateral_offset(id);
            self.lc_from = ctx.traffic.lane_index(id);
            self.lc_to = self.lc_from + self.direction.signed_step();
            self.exec_lane_change(&mut *ctx.traffic, ctx.params);
        } else if self.in_lane_change {
            let traffic = &*ctx.traffic;
            if traffic.lateral_speed(id) != 0.0 {
                let mut reason = None;
                if !self.alpha_area_free(traffic, ctx.params) {
                    reason = Some("Front area occupied");
                }
                if !self.beta_area_free(traffic, ctx.params) {
                    reason = Some("Rear area occupied");
                }
                if self.member_not_following(traffic, ctx.params) {
                    reason = Some("A member is not following laterally anymore");
                }
                if let Some(reason) = reason {
                    self.request_change_back(reason);
                }
            } else if self.in_new_lane && traffic.is_centered(id) {
                self.lc_from = self.lc_to;
                self.in_lane_change = false;
            }
        }
    }

    /// Cleanup after a finished lane change.
    pub fn lane_change_complete(&mut self) {
        self.in_new_lane = false;
        self.direction = self.direction.flip();
    }

    /// Return toward the lane the maneuver started from.
    pub fn changing_back<T: Traffic + ?Sized>(&mut self, ctx: &mut StepContext<'_, T>) {
        let id = self.id;
        if self.begin_change_back {
            self.begin_change_back = false;
            self.in_change_back = true;
            self.in_lane_change = false;
            self.lane_offset_last_step = ctx.traffic.lateral_offset(id);
            self.direction = self.direction.flip();
            self.lc_from = ctx.traffic.lane_index(id);
            self.lc_to = if self.in_new_lane {
                self.lc_from + self.direction.signed_step()
            } else {
                self.lc_from
            };
            // Past the marking: the original lane is now the new one.
            self.in_new_lane = !self.in_new_lane;
            self.exec_lane_change(&mut *ctx.traffic, ctx.params);
        } else if self.in_change_back && self.in_new_lane && ctx.traffic.is_centered(id) {
            self.direction = self.direction.flip();
            self.in_change_back = false;
        }
    }
}
