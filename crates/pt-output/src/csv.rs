//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `protocol_events.csv`
//! - `visited_states.csv`
//! - `vehicle_summary.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, SummaryRow, VisitRow};

pub struct CsvWriter {
    events:    Writer<File>,
    visits:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three CSV files and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join("protocol_events.csv"))?;
        events.write_record(["tick", "step", "vehicle", "event", "detail"])?;

        let mut visits = Writer::from_path(dir.join("visited_states.csv"))?;
        visits.write_record(["vehicle", "index", "state"])?;

        let mut summaries = Writer::from_path(dir.join("vehicle_summary.csv"))?;
        summaries.write_record([
            "vehicle",
            "states_visited",
            "lanes",
            "speed_min",
            "speed_max",
            "overtaking_times",
        ])?;

        Ok(Self { events, visits, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.step.to_string(),
                row.vehicle.to_string(),
                row.event.to_string(),
                row.detail.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_visits(&mut self, rows: &[VisitRow]) -> OutputResult<()> {
        for row in rows {
            self.visits.write_record(&[
                row.vehicle.to_string(),
                row.index.to_string(),
                row.state.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.vehicle.to_string(),
            row.states_visited.to_string(),
            row.lanes.clone(),
            row.speed_min.to_string(),
            row.speed_max.to_string(),
            row.overtaking_times.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.visits.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
