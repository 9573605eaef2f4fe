//! Unit tests for the message channel.

#[cfg(test)]
mod helpers {
    use pt_core::VehicleId;

    pub const LEADER: VehicleId = VehicleId(0);
    pub const F1:     VehicleId = VehicleId(1);
    pub const F2:     VehicleId = VehicleId(2);
}

#[cfg(test)]
mod delivery {
    use pt_core::{Direction, Tick};

    use super::helpers::*;
    use crate::{C2x, FixedDelay, MessageKind, Payload};

    #[test]
    fn reliable_delivers_in_send_step() {
        let mut c2x = C2x::reliable();
        c2x.send(LEADER, F1, MessageKind::ReqSensorData, Payload::Direction(Direction::Left), Tick(4));
        let got = c2x.receive(F1, Tick(4));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].kind, MessageKind::ReqSensorData);
        assert_eq!(got[0].payload.direction(), Some(Direction::Left));
        assert!(c2x.is_empty());
    }

    #[test]
    fn not_visible_before_delay() {
        let mut c2x = C2x::new(Box::new(FixedDelay(3)));
        c2x.send(LEADER, F1, MessageKind::Abort, Payload::Empty, Tick(10));
        assert!(c2x.receive(F1, Tick(10)).is_empty());
        assert!(c2x.receive(F1, Tick(12)).is_empty());
        assert_eq!(c2x.receive(F1, Tick(13)).len(), 1);
    }

    #[test]
    fn delivered_at_most_once() {
        let mut c2x = C2x::reliable();
        c2x.send(F1, LEADER, MessageKind::AbortComplete, Payload::Empty, Tick(0));
        assert_eq!(c2x.receive(LEADER, Tick(0)).len(), 1);
        assert!(c2x.receive(LEADER, Tick(0)).is_empty());
        assert!(c2x.receive(LEADER, Tick(100)).is_empty());
    }

    #[test]
    fn only_destination_sees_message() {
        let mut c2x = C2x::reliable();
        c2x.send(LEADER, F1, MessageKind::BeginLaneChange, Payload::Empty, Tick(0));
        assert!(c2x.receive(F2, Tick(0)).is_empty());
        assert!(c2x.receive(LEADER, Tick(0)).is_empty());
        assert_eq!(c2x.len(), 1);
        assert_eq!(c2x.receive(F1, Tick(0)).len(), 1);
    }

    #[test]
    fn fifo_per_destination() {
        let mut c2x = C2x::reliable();
        c2x.send(F1, LEADER, MessageKind::RespSensorData, Payload::AreaReport { own_area_free: true }, Tick(0));
        c2x.send(F2, LEADER, MessageKind::RespSensorData, Payload::AreaReport { own_area_free: false }, Tick(0));
        c2x.send(LEADER, F1, MessageKind::Abort, Payload::Empty, Tick(0));
        let got = c2x.receive(LEADER, Tick(0));
        let sources: Vec<_> = got.iter().map(|e| e.source).collect();
        assert_eq!(sources, vec![F1, F2]);
        assert!(got[0].id < got[1].id);
        assert_eq!(got[1].payload.own_area_free(), Some(false));
        assert_eq!(c2x.pending().len(), 1);
    }

    #[test]
    fn clear_empties_queue() {
        let mut c2x = C2x::new(Box::new(FixedDelay(50)));
        c2x.send(LEADER, F1, MessageKind::Abort, Payload::Empty, Tick(0));
        c2x.send(LEADER, F2, MessageKind::Abort, Payload::Empty, Tick(0));
        c2x.clear();
        assert!(c2x.is_empty());
        assert!(c2x.receive(F1, Tick(1_000)).is_empty());
    }

    #[test]
    fn undrained_queue_grows() {
        // Nothing expires on its own: an unreceived message stays queued.
        let mut c2x = C2x::reliable();
        for step in 0..25 {
            c2x.send(LEADER, F2, MessageKind::LaneChangeComplete, Payload::Empty, Tick(step));
        }
        assert_eq!(c2x.len(), 25);
    }
}

#[cfg(test)]
mod latency {
    use pt_core::{OvertakingParams, Tick};

    use super::helpers::*;
    use crate::{C2x, ExponentialDelay, LatencyModel, MessageKind, NoDelay, Payload};

    #[test]
    fn no_delay_is_zero() {
        assert_eq!(NoDelay.delay_steps(LEADER, F1), 0);
    }

    #[test]
    fn exponential_is_seeded() {
        let mut a = ExponentialDelay::new(5.0, 23_422);
        let mut b = ExponentialDelay::new(5.0, 23_422);
        let da: Vec<u64> = (0..50).map(|_| a.delay_steps(LEADER, F1)).collect();
        let db: Vec<u64> = (0..50).map(|_| b.delay_steps(LEADER, F1)).collect();
        assert_eq!(da, db);
        assert!(da.iter().any(|&d| d > 0));
    }

    #[test]
    fn from_params_zero_mean_is_reliable() {
        let mut c2x = C2x::from_params(&OvertakingParams::thesis());
        for _ in 0..10 {
            c2x.send(LEADER, F1, MessageKind::Abort, Payload::Empty, Tick(7));
        }
        assert!(c2x.delays().iter().all(|&d| d == 0));
        assert_eq!(c2x.receive(F1, Tick(7)).len(), 10);
    }

    #[test]
    fn delay_history_matches_gate() {
        let mut c2x = C2x::from_params(&OvertakingParams::default());
        for _ in 0..20 {
            c2x.send(LEADER, F1, MessageKind::Abort, Payload::Empty, Tick(100));
        }
        assert_eq!(c2x.delays().len(), 20);
        for env in c2x.pending() {
            let d = c2x.delays()[env.id as usize];
            assert_eq!(env.deliver_at, Tick(100 + d));
        }
        let max = c2x.delays().iter().copied().max().unwrap_or(0);
        assert_eq!(c2x.receive(F1, Tick(100 + max)).len(), 20);
    }
}
