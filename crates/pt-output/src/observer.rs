//! `PlatoonOutputObserver<W>` — bridges `PlatoonObserver` to an `OutputWriter`.

use pt_core::{Tick, VehicleId};
use pt_platoon::PlatoonObserver;
use pt_vehicle::{ProtocolEvent, State, VehicleRecord};

use crate::row::{EventRow, SummaryRow, VisitRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`PlatoonObserver`] that writes protocol events every tick and the
/// per-member metrics at the end of the run.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run, check with
/// [`take_error`][Self::take_error].
pub struct PlatoonOutputObserver<W: OutputWriter> {
    writer:     W,
    tick:       Tick,
    /// Events of the current tick, written at tick end.
    pending:    Vec<EventRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> PlatoonOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, tick: Tick::ZERO, pending: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> PlatoonObserver for PlatoonOutputObserver<W> {
    fn on_tick_start(&mut self, tick: Tick) {
        self.tick = tick;
    }

    fn on_event(&mut self, event: &ProtocolEvent) {
        self.pending.push(EventRow::from_event(self.tick.0, event));
    }

    fn on_tick_end(&mut self, _tick: Tick, _leader_state: State) {
        if self.pending.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.pending);
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick, records: &[(VehicleId, &VehicleRecord)]) {
        for &(id, record) in records {
            let result = self.writer.write_visits(&VisitRow::from_record(id, record));
            self.store_err(result);
            let result = self.writer.write_summary(&SummaryRow::from_record(id, record));
            self.store_err(result);
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
