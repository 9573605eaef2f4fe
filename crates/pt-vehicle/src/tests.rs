//! Unit tests for the shared vehicle state machine.

use pt_c2x::C2x;
use pt_core::{OvertakingParams, VehicleId};
use pt_traffic::{Radar, TrafficSnapshot, VehicleSample};

use crate::{StepContext, VehicleCore};

// ── Helpers ───────────────────────────────────────────────────────────────────

const LEADER: VehicleId = VehicleId(0);
const MIDDLE: VehicleId = VehicleId(1);
const LAST:   VehicleId = VehicleId(2);
const CAR:    VehicleId = VehicleId(10);

fn members() -> Vec<VehicleId> {
    vec![LEADER, MIDDLE, LAST]
}

/// Three members in lane 0 at 25 m/s, 10 m apart.
fn road() -> TrafficSnapshot {
    let mut t = TrafficSnapshot::new(3.2);
    t.insert(LEADER, VehicleSample::new(120.0, 0, 25.0));
    t.insert(MIDDLE, VehicleSample::new(110.0, 0, 25.0));
    t.insert(LAST, VehicleSample::new(100.0, 0, 25.0));
    t
}

fn core(id: VehicleId, params: &OvertakingParams) -> VehicleCore {
    VehicleCore::new(id, Radar::from_params(params, members()))
}

/// Run one prelude for `v`.
fn step(v: &mut VehicleCore, t: &mut TrafficSnapshot, c2x: &mut C2x, p: &OvertakingParams) {
    let mut ctx = StepContext::new(t, c2x, p);
    v.begin_step(&mut ctx);
}

// ── Prelude ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod prelude {
    use pt_c2x::{FixedDelay, MessageKind, Payload};
    use pt_core::Tick;

    use super::*;
    use crate::{State, Visit};

    #[test]
    fn starts_idle_with_one_visit() {
        let p = OvertakingParams::thesis();
        let v = core(LEADER, &p);
        assert_eq!(v.state(), State::Idle);
        assert_eq!(v.record().states, vec![Visit::left(State::Idle)]);
        assert_eq!(v.step, Tick::ZERO);
    }

    #[test]
    fn step_and_timer_advance() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.set_timer(2);
        step(&mut v, &mut t, &mut c2x, &p);
        assert_eq!((v.step, v.timer), (Tick(1), 1));
        step(&mut v, &mut t, &mut c2x, &p);
        step(&mut v, &mut t, &mut c2x, &p);
        assert_eq!((v.step, v.timer), (Tick(3), 0));
    }

    #[test]
    fn inbox_is_replaced_each_tick() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(MIDDLE, &p);
        c2x.send(LEADER, MIDDLE, MessageKind::BeginLaneChange, Payload::Empty, Tick(0));
        step(&mut v, &mut t, &mut c2x, &p);
        assert_eq!(v.inbox().len(), 1);
        // Unconsumed message is gone after the next prelude.
        step(&mut v, &mut t, &mut c2x, &p);
        assert!(v.inbox().is_empty());
    }

    #[test]
    fn delayed_message_waits_for_gate() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        let mut c2x = C2x::new(Box::new(FixedDelay(2)));
        let mut v = core(MIDDLE, &p);
        c2x.send(LEADER, MIDDLE, MessageKind::Abort, Payload::Empty, Tick(1));
        step(&mut v, &mut t, &mut c2x, &p);
        step(&mut v, &mut t, &mut c2x, &p);
        assert!(v.inbox().is_empty());
        step(&mut v, &mut t, &mut c2x, &p);
        assert_eq!(v.inbox().len(), 1);
    }

    #[test]
    fn take_messages_filters_by_kind() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        c2x.send(MIDDLE, LEADER, MessageKind::Abort, Payload::Empty, Tick(0));
        c2x.send(LAST, LEADER, MessageKind::LaneChangeComplete, Payload::Empty, Tick(0));
        step(&mut v, &mut t, &mut c2x, &p);
        let aborts = v.take_messages(MessageKind::Abort);
        assert_eq!(aborts.len(), 1);
        assert_eq!(aborts[0].source, MIDDLE);
        assert_eq!(v.inbox().len(), 1);
        assert!(v.take_messages(MessageKind::Abort).is_empty());
    }

    #[test]
    fn lanes_deduplicated_and_speed_rounded() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        t.set_speed(LEADER, 24.996);
        step(&mut v, &mut t, &mut c2x, &p);
        t.set_speed(LEADER, 22.123);
        step(&mut v, &mut t, &mut c2x, &p);
        t.set_lane(LEADER, 1);
        step(&mut v, &mut t, &mut c2x, &p);
        t.set_lane(LEADER, 0);
        step(&mut v, &mut t, &mut c2x, &p);
        assert_eq!(v.record().lanes, vec![0, 1, 0]);
        assert_eq!(v.record().speed_max, 25.0);
        assert_eq!(v.record().speed_min, 22.12);
    }

    #[test]
    fn crossing_needs_sign_flip_beyond_minimum() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        let mut v = core(LEADER, &p);
        t.set_lateral(LEADER, 1.2, 1.0);
        v.detect_lane_crossing(&t, &p);
        t.set_lateral(LEADER, -0.3, 1.0);
        v.detect_lane_crossing(&t, &p);
        assert!(!v.in_new_lane);
        t.set_lateral(LEADER, 0.4, 1.0);
        v.detect_lane_crossing(&t, &p);
        t.set_lateral(LEADER, -1.5, 1.0);
        v.detect_lane_crossing(&t, &p);
        assert!(v.in_new_lane);
    }
}

// ── State recording ───────────────────────────────────────────────────────────

#[cfg(test)]
mod states {
    use pt_core::Direction;

    use super::*;
    use crate::{EventKind, State};

    #[test]
    fn right_states_are_prefixed() {
        let p = OvertakingParams::thesis();
        let mut v = core(LEADER, &p);
        v.direction = Direction::Right;
        v.set_state(State::AssertOwnAreas);
        v.set_state(State::Passing);
        v.set_state(State::OvertakingComplete);
        let names: Vec<String> = v.record().states.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["IDLE", "R_ASSERT_OWN_AREAS", "PASSING", "OVERTAKING_COMPLETE"]);
    }

    #[test]
    fn every_switch_emits_an_event() {
        let p = OvertakingParams::thesis();
        let mut v = core(LEADER, &p);
        v.set_state(State::VehicleAhead);
        let events = v.take_events();
        // The initial IDLE is recorded but not reported.
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].kind, EventKind::StateChanged { visit } if visit.state == State::VehicleAhead));
        assert!(v.events().is_empty());
    }

    #[test]
    fn change_back_request_keeps_reason() {
        let p = OvertakingParams::thesis();
        let mut v = core(MIDDLE, &p);
        v.request_change_back("Front area occupied");
        assert!(v.begin_change_back);
        assert_eq!(v.abort_message, "Front area occupied");
    }
}

// ── Area safety ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod areas {
    use pt_core::Direction;

    use super::*;

    #[test]
    fn empty_areas_are_free() {
        let p = OvertakingParams::thesis();
        let t = road();
        let v = core(LEADER, &p);
        assert!(v.alpha_area_free(&t, &p));
        assert!(v.beta_area_free(&t, &p));
    }

    #[test]
    fn front_left_car_inside_safety_distance() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        // gap = 140 - 4 - 120 = 16 < 25.25
        t.insert(CAR, VehicleSample::new(140.0, 1, 25.0));
        let v = core(LEADER, &p);
        assert!(!v.alpha_area_free(&t, &p));
        t.set_x(CAR, 160.0);
        assert!(v.alpha_area_free(&t, &p));
    }

    #[test]
    fn fast_rear_left_car_blocks() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        // gap = 116 - 60 = 56; d_min = (0.5·25 + 30 + 20)·1.01 = 63.125
        t.insert(CAR, VehicleSample::new(60.0, 1, 30.0));
        let v = core(LEADER, &p);
        assert!(!v.beta_area_free(&t, &p));
        t.set_x(CAR, 50.0);
        assert!(v.beta_area_free(&t, &p));
    }

    #[test]
    fn right_rear_uses_truck_gap() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        t.set_lane(LEADER, 1);
        t.insert(CAR, VehicleSample::new(80.0, 0, 20.0));
        let mut v = core(LEADER, &p);
        v.direction = Direction::Right;
        // gap 36 < 50·1.01
        assert!(!v.beta_area_free(&t, &p));
    }

    #[test]
    fn in_new_lane_looks_straight_ahead() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        t.insert(CAR, VehicleSample::new(130.0, 1, 25.0));
        let mut v = core(LEADER, &p);
        v.in_lane_change = true;
        v.in_new_lane = true;
        // Leader is still in lane 0 in the snapshot; lane 0 ahead is empty.
        assert!(v.alpha_area_free(&t, &p));
        v.in_new_lane = false;
        assert!(!v.alpha_area_free(&t, &p));
    }

    #[test]
    fn predicates_are_idempotent() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        t.insert(CAR, VehicleSample::new(60.0, 1, 30.0));
        let v = core(LEADER, &p);
        let first = (v.alpha_area_free(&t, &p), v.beta_area_free(&t, &p));
        for _ in 0..5 {
            assert_eq!((v.alpha_area_free(&t, &p), v.beta_area_free(&t, &p)), first);
        }
    }

    #[test]
    fn divergent_neighbor_member() {
        let p = OvertakingParams::thesis();
        let mut t = road();
        let v = core(MIDDLE, &p);
        t.set_lateral(LEADER, 1.0, 1.0);
        t.set_lateral(MIDDLE, 0.8, 1.0);
        t.set_lateral(LAST, 0.7, 1.0);
        assert!(!v.member_not_following(&t, &p));
        t.set_lateral(LAST, 0.2, 1.0);
        assert!(v.member_not_following(&t, &p));
    }
}

// ── Lane-change mechanics ─────────────────────────────────────────────────────

#[cfg(test)]
mod maneuver {
    use super::*;

    #[test]
    fn begin_lane_change_commands_full_lane() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.begin_lane_change = true;
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_lane(&mut ctx);
        assert!(v.in_lane_change && !v.begin_lane_change && !v.in_new_lane);
        assert_eq!((v.lc_from, v.lc_to), (0, 1));
        assert_eq!(t.lateral_requests(), &[(LEADER, 3.2)]);
    }

    #[test]
    fn hazard_while_moving_requests_change_back() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(MIDDLE, &p);
        v.in_lane_change = true;
        for id in [LEADER, MIDDLE, LAST] {
            t.set_lateral(id, 0.5, 1.0);
        }
        // gap = 124 - 110 = 14 < 25
        t.insert(CAR, VehicleSample::new(128.0, 1, 25.0));
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_lane(&mut ctx);
        assert!(v.begin_change_back);
        assert_eq!(v.abort_message, "Front area occupied");
    }

    #[test]
    fn completes_when_centred_in_new_lane() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.in_lane_change = true;
        v.lc_from = 0;
        v.lc_to = 1;
        t.set_lane(LEADER, 1);
        t.set_lateral(LEADER, 0.0, 0.0);
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_lane(&mut ctx);
        // Not past the marking yet: keep going.
        assert!(v.in_lane_change);
        v.in_new_lane = true;
        v.changing_lane(&mut ctx);
        assert!(!v.in_lane_change);
        assert_eq!(v.lc_from, 1);
    }

    #[test]
    fn change_back_before_crossing_recentres() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.in_lane_change = true;
        v.begin_change_back = true;
        t.set_lateral(LEADER, 0.9, 1.0);
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_back(&mut ctx);
        assert!(v.in_change_back && !v.in_lane_change);
        assert!(v.in_new_lane);
        assert_eq!(v.direction, pt_core::Direction::Right);
        assert_eq!((v.lc_from, v.lc_to), (0, 0));
        assert_eq!(t.lateral_requests(), &[(LEADER, -0.9)]);
    }

    #[test]
    fn change_back_after_crossing_returns_a_lane() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.in_lane_change = true;
        v.in_new_lane = true;
        v.begin_change_back = true;
        t.set_lane(LEADER, 1);
        t.set_lateral(LEADER, -1.0, 1.0);
        {
            let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
            v.changing_back(&mut ctx);
        }
        assert!(!v.in_new_lane);
        assert_eq!((v.lc_from, v.lc_to), (1, 0));
        let (_, lateral) = t.lateral_requests()[0];
        assert!((lateral - -2.2).abs() < 1e-9);

        // Back in lane 0 and centred: direction flips back to left.
        v.in_new_lane = true;
        t.set_lane(LEADER, 0);
        t.set_lateral(LEADER, 0.0, 0.0);
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_back(&mut ctx);
        assert!(!v.in_change_back);
        assert_eq!(v.direction, pt_core::Direction::Left);
    }

    #[test]
    fn flags_never_both_set() {
        let p = OvertakingParams::thesis();
        let (mut t, mut c2x) = (road(), C2x::reliable());
        let mut v = core(LEADER, &p);
        v.begin_lane_change = true;
        let mut ctx = StepContext::new(&mut t, &mut c2x, &p);
        v.changing_lane(&mut ctx);
        v.begin_change_back = true;
        v.changing_back(&mut ctx);
        assert!(!(v.in_lane_change && v.in_change_back));
    }

    #[test]
    fn completion_cleanup_flips_direction() {
        let p = OvertakingParams::thesis();
        let mut v = core(LEADER, &p);
        v.in_new_lane = true;
        v.lane_change_complete();
        assert!(!v.in_new_lane);
        assert_eq!(v.direction, pt_core::Direction::Right);
    }
}

// ── Kinematics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kinematics {
    use pt_core::{Direction, OvertakingParams};

    use crate::kinematics::*;

    fn geo(direction: Direction) -> PassGeometry {
        PassGeometry {
            speed:                     25.0,
            max_accel:                 2.5,
            max_lateral_speed:         1.0,
            distance_to_original_lane: 3.2,
            platoon_length:            30.0,
            safety_dist:               25.25,
            direction,
        }
    }

    #[test]
    fn platoon_safety_distance() {
        let p = OvertakingParams::default();
        assert!((safety_dist_platoon(1.0, 25.0, true, &p) - 25.0).abs() < 1e-9);
        assert!((safety_dist_platoon(1.0, 25.0, false, &p) - 25.25).abs() < 1e-9);
    }

    #[test]
    fn rear_gap_faster_vehicle() {
        let p = OvertakingParams::default();
        let d = min_rear_gap(-1.0, 25.0, 30.0, Direction::Left, true, &p);
        assert!((d - 62.5).abs() < 1e-9);
    }

    #[test]
    fn rear_gap_slower_vehicle_and_truck_floor() {
        let p = OvertakingParams::default();
        assert!((min_rear_gap(-1.0, 25.0, 20.0, Direction::Left, true, &p) - 36.0).abs() < 1e-9);
        assert_eq!(min_rear_gap(-1.0, 25.0, 20.0, Direction::Right, true, &p), 50.0);
    }

    #[test]
    fn rear_gap_positive_accel_is_infinite() {
        let p = OvertakingParams::default();
        assert!(min_rear_gap(0.5, 25.0, 20.0, Direction::Left, false, &p).is_infinite());
        assert!(min_rear_gap(0.0, 25.0, 30.0, Direction::Right, true, &p).is_infinite());
    }

    #[test]
    fn slower_vehicle_gap() {
        let p = OvertakingParams::default();
        assert_eq!(safety_dist_slower(20.0, &p), 50.0);
        assert!((safety_dist_slower(30.0, &p) - 54.0).abs() < 1e-9);
    }

    #[test]
    fn pass_time_above_lane_ceiling() {
        let p = OvertakingParams::default();
        let t = predicted_overtaking_time(&geo(Direction::Left), 30.0, 20.0, 100.0, &p);
        assert!((t - 23.575).abs() < 1e-9, "got {t}");
    }

    #[test]
    fn pass_time_below_lane_ceiling() {
        let p = OvertakingParams::default();
        let t = predicted_overtaking_time(&geo(Direction::Left), 60.0, 20.0, 100.0, &p);
        assert!((t - 13.967145334803703).abs() < 1e-9, "got {t}");
    }

    #[test]
    fn pass_time_return_trip_shortens_distance() {
        let p = OvertakingParams::default();
        let t = predicted_overtaking_time(&geo(Direction::Right), 30.0, 20.0, 100.0, &p);
        assert!((t - 16.975).abs() < 1e-9, "got {t}");
    }

    #[test]
    fn pass_time_zero_inside_safety_distance() {
        let p = OvertakingParams::default();
        assert_eq!(predicted_overtaking_time(&geo(Direction::Left), 30.0, 20.0, 20.0, &p), 0.0);
        // 80 − 66 = 14 < 25.25 on the way back
        assert_eq!(predicted_overtaking_time(&geo(Direction::Right), 30.0, 20.0, 80.0, &p), 0.0);
    }

    #[test]
    fn pass_time_degenerate_is_infinite() {
        let p = OvertakingParams::default();
        let mut g = geo(Direction::Left);
        g.max_accel = 0.0;
        assert!(predicted_overtaking_time(&g, 30.0, 20.0, 100.0, &p).is_infinite());
        let g = geo(Direction::Left);
        assert!(predicted_overtaking_time(&g, 20.0, 20.0, 100.0, &p).is_infinite());
    }
}
