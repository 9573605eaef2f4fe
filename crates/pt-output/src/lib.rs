//! `pt-output` — run output writers for platoon overtaking runs.
//!
//! | Backend | Files created                                                         |
//! |---------|-----------------------------------------------------------------------|
//! | CSV     | `protocol_events.csv`, `visited_states.csv`, `vehicle_summary.csv`    |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`PlatoonOutputObserver`], which implements `pt_platoon::PlatoonObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pt_output::{CsvWriter, PlatoonOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = PlatoonOutputObserver::new(writer);
//! for _ in 0..steps {
//!     platoon.tick(&mut traffic, &mut obs);
//! }
//! platoon.finish(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::PlatoonOutputObserver;
pub use row::{EventRow, SummaryRow, VisitRow};
pub use writer::OutputWriter;
