//! The `OutputWriter` trait implemented by backend writers.

use crate::{EventRow, OutputResult, SummaryRow, VisitRow};

/// A sink for run output.
///
/// Errors are returned to the caller; [`PlatoonOutputObserver`] keeps the
/// first one for [`take_error`].
///
/// [`PlatoonOutputObserver`]: crate::PlatoonOutputObserver
/// [`take_error`]: crate::PlatoonOutputObserver::take_error
pub trait OutputWriter {
    /// Write the events of one tick.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write one member's visited-state sequence.
    fn write_visits(&mut self, rows: &[VisitRow]) -> OutputResult<()>;

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
