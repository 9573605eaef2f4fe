//! Tests for pt-output.

use pt_core::{OvertakingParams, VehicleId};
use pt_platoon::{Platoon, PlatoonBuilder, PlatoonObserver};
use pt_traffic::{TrafficSnapshot, VehicleSample};
use tempfile::TempDir;

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Three-member platoon with a slow truck 100 m ahead of the leader.
fn scene() -> (Platoon, TrafficSnapshot) {
    let (platoon, formation) = PlatoonBuilder::new(OvertakingParams::thesis())
        .members(3)
        .desired_speed(30.0)
        .start_position(0.0)
        .build()
        .expect("valid platoon");
    let mut t = TrafficSnapshot::new(3.2);
    for slot in &formation.slots {
        t.insert(slot.id, VehicleSample::new(slot.x, slot.lane, 25.0));
    }
    t.insert(VehicleId(10), VehicleSample::new(154.75, 0, 20.0).with_length(18.75));
    (platoon, t)
}

fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut rdr = csv::Reader::from_path(dir.path().join(file)).expect("open csv");
    let headers = rdr.headers().expect("headers").iter().map(str::to_owned).collect();
    let rows = rdr.records().map(|r| r.expect("record")).collect();
    (headers, rows)
}

#[cfg(test)]
mod csv_tests {
    use super::*;
    use crate::csv::CsvWriter;
    use crate::row::{EventRow, SummaryRow};
    use crate::writer::OutputWriter;

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("protocol_events.csv").exists());
        assert!(dir.path().join("visited_states.csv").exists());
        assert!(dir.path().join("vehicle_summary.csv").exists());
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("protocol_events.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(read(&dir, "protocol_events.csv").0, ["tick", "step", "vehicle", "event", "detail"]);
        assert_eq!(read(&dir, "visited_states.csv").0, ["vehicle", "index", "state"]);
        assert_eq!(
            read(&dir, "vehicle_summary.csv").0,
            ["vehicle", "states_visited", "lanes", "speed_min", "speed_max", "overtaking_times"]
        );
    }

    #[test]
    fn event_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = EventRow {
            tick:    4,
            step:    4,
            vehicle: 0,
            event:   "message_sent",
            detail:  "REQ_SENSOR_DATA -> VehicleId(1)".to_string(),
        };
        w.write_events(&[row.clone(), EventRow { vehicle: 1, ..row }]).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "protocol_events.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "message_sent");
        assert_eq!(&rows[0][4], "REQ_SENSOR_DATA -> VehicleId(1)");
        assert_eq!(&rows[1][2], "1");
    }

    #[test]
    fn summary_row_joins_lists() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_summary(&SummaryRow {
            vehicle:          2,
            states_visited:   9,
            lanes:            "0|1|0".to_string(),
            speed_min:        24.5,
            speed_max:        30.0,
            overtaking_times: "12.5".to_string(),
        })
        .unwrap();
        w.finish().unwrap();
        let (_, rows) = read(&dir, "vehicle_summary.csv");
        assert_eq!(&rows[0][2], "0|1|0");
        assert_eq!(&rows[0][3], "24.5");
        assert_eq!(&rows[0][5], "12.5");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use super::*;
    use crate::{CsvWriter, EventRow, OutputError, OutputResult, OutputWriter, PlatoonOutputObserver, SummaryRow, VisitRow};

    #[test]
    fn run_writes_events_visits_and_summaries() {
        let dir = tmp();
        let (mut platoon, mut traffic) = scene();
        let mut obs = PlatoonOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        for _ in 0..8 {
            platoon.tick(&mut traffic, &mut obs);
        }
        platoon.finish(&mut obs);
        assert!(obs.take_error().is_none());

        let (_, events) = read(&dir, "protocol_events.csv");
        let first = &events[0];
        assert_eq!((&first[0], &first[2], &first[3]), ("1", "0", "state_changed"));
        assert_eq!(&first[4], "VEHICLE_AHEAD");
        assert!(events.iter().any(|r| &r[3] == "message_sent" && &r[4] == "REQ_SENSOR_DATA -> VehicleId(2)"));

        let (_, visits) = read(&dir, "visited_states.csv");
        let leader: Vec<&str> = visits.iter().filter(|r| &r[0] == "0").map(|r| r.get(2).unwrap_or("")).collect();
        assert_eq!(
            leader,
            [
                "IDLE",
                "VEHICLE_AHEAD",
                "ASSERT_OWN_AREAS",
                "REQUEST_SENSOR_DATA",
                "WAIT_FOR_RESPONSES",
                "ASSERT_MANEUVER_AREA",
                "LANE_CHANGE_SAFE",
                "CHANGING_LANE",
            ]
        );

        let (_, summaries) = read(&dir, "vehicle_summary.csv");
        assert_eq!(summaries.len(), 3);
        assert_eq!(&summaries[0][2], "0");
        assert_eq!(&summaries[0][3], "25");
    }

    /// Fails every write with an I/O error.
    #[derive(Default)]
    struct Broken {
        calls: usize,
    }

    impl OutputWriter for Broken {
        fn write_events(&mut self, _rows: &[EventRow]) -> OutputResult<()> {
            self.calls += 1;
            Err(std::io::Error::other(format!("write {}", self.calls)).into())
        }
        fn write_visits(&mut self, _rows: &[VisitRow]) -> OutputResult<()> {
            self.calls += 1;
            Err(std::io::Error::other(format!("write {}", self.calls)).into())
        }
        fn write_summary(&mut self, _row: &SummaryRow) -> OutputResult<()> {
            self.calls += 1;
            Err(std::io::Error::other(format!("write {}", self.calls)).into())
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn keeps_first_error_only() {
        let (mut platoon, mut traffic) = scene();
        let mut obs = PlatoonOutputObserver::new(Broken::default());
        for _ in 0..3 {
            platoon.tick(&mut traffic, &mut obs);
        }
        platoon.finish(&mut obs);
        match obs.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.to_string(), "write 1"),
            other => panic!("expected first I/O error, got {other:?}"),
        }
        assert!(obs.take_error().is_none());
        assert!(obs.into_writer().calls > 1);
    }

    #[test]
    fn quiet_tick_writes_nothing() {
        let mut obs = PlatoonOutputObserver::new(Broken::default());
        obs.on_tick_start(pt_core::Tick(1));
        obs.on_tick_end(pt_core::Tick(1), pt_vehicle::State::Idle);
        assert!(obs.take_error().is_none());
    }
}
