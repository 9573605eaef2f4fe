//! The platoon: one leader, ordered followers and their shared channel.

use pt_c2x::C2x;
use pt_core::{OvertakingParams, Tick, VehicleId};
use pt_traffic::Traffic;
use pt_vehicle::{MetricKey, MetricValue, StepContext, VehicleCore, VehicleRecord};
use tracing::info;

use crate::{Follower, Leader, LeaderState, PlatoonObserver};

/// The convoy driven by an external simulator, one [`tick`](Self::tick) per
/// simulation step.
///
/// Build with [`PlatoonBuilder`][crate::PlatoonBuilder].
pub struct Platoon {
    pub(crate) leader:      Leader,
    /// Front to back; same order as the leader's follower ids.
    pub(crate) followers:   Vec<Follower>,
    pub(crate) c2x:         C2x,
    params:                 OvertakingParams,
    tick:                   Tick,
    did_overtake:           bool,
}

impl Platoon {
    pub(crate) fn new(
        leader:    Leader,
        followers: Vec<Follower>,
        c2x:       C2x,
        params:    OvertakingParams,
    ) -> Self {
        Self { leader, followers, c2x, params, tick: Tick::ZERO, did_overtake: false }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run the leader, then every follower front to back, and forward their
    /// events to `observer`.
    pub fn tick<T, O>(&mut self, traffic: &mut T, observer: &mut O)
    where
        T: Traffic + ?Sized,
        O: PlatoonObserver + ?Sized,
    {
        self.tick = self.tick.next();
        observer.on_tick_start(self.tick);

        if !self.did_overtake && self.leader.state() == LeaderState::OvertakingComplete {
            info!(tick = self.tick.0, leader = %self.leader.id(), "overtaking cycle complete");
            self.did_overtake = true;
        }

        let mut ctx = StepContext::new(traffic, &mut self.c2x, &self.params);

        self.leader.tick(&mut ctx);
        drain_events(&mut self.leader.core, observer);

        for follower in &mut self.followers {
            follower.tick(&mut ctx);
            drain_events(&mut follower.core, observer);
        }

        observer.on_tick_end(self.tick, self.leader.state().into());
    }

    /// Hand every member's record to `observer`.
    pub fn finish<O: PlatoonObserver + ?Sized>(&self, observer: &mut O) {
        observer.on_run_end(self.tick, &self.records());
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Set once the leader has passed through `OVERTAKING_COMPLETE`.
    pub fn did_overtake(&self) -> bool {
        self.did_overtake
    }

    pub fn leader(&self) -> &Leader {
        &self.leader
    }

    pub fn followers(&self) -> &[Follower] {
        &self.followers
    }

    pub fn c2x(&self) -> &C2x {
        &self.c2x
    }

    pub fn params(&self) -> &OvertakingParams {
        &self.params
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Member ids, leader first.
    pub fn members(&self) -> Vec<VehicleId> {
        std::iter::once(self.leader.id())
            .chain(self.followers.iter().map(Follower::id))
            .collect()
    }

    pub fn len(&self) -> usize {
        1 + self.followers.len()
    }

    /// Always `false`: a platoon has a leader.
    pub fn is_empty(&self) -> bool {
        false
    }

    // ── Metrics ───────────────────────────────────────────────────────────

    pub fn records(&self) -> Vec<(VehicleId, &VehicleRecord)> {
        std::iter::once(self.leader.core())
            .chain(self.followers.iter().map(Follower::core))
            .map(|core| (core.id, core.record()))
            .collect()
    }

    /// One metric for every member, leader first.
    pub fn metrics_for(&self, key: MetricKey) -> Vec<(VehicleId, MetricValue)> {
        self.records()
            .into_iter()
            .map(|(id, record)| (id, record.metric(key)))
            .collect()
    }
}

fn drain_events<O: PlatoonObserver + ?Sized>(core: &mut VehicleCore, observer: &mut O) {
    for event in core.take_events() {
        observer.on_event(&event);
    }
}
