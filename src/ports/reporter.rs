//! Pipeline event observer port.
//!
//! One reporter is created per run and passed by reference to every stage.
//! All methods default to no-ops so implementations only override the events
//! they care about.

use chrono::NaiveDate;

pub trait PipelineReporter {
    fn records_loaded(&self, _records: usize, _instruments: usize) {}

    /// A later record replaced an earlier one for the same instrument and date.
    fn duplicate_replaced(&self, _instrument: &str, _date: NaiveDate) {}

    fn bars_resampled(&self, _bars: usize, _instruments: usize) {}

    fn indicators_computed(&self, _instruments: usize) {}

    fn series_accepted(&self, _instrument: &str, _length: usize) {}

    fn series_rejected(&self, _instrument: &str, _actual: usize, _expected: usize) {}

    fn series_written(&self, _instrument: &str, _destination: &str, _rows: usize) {}
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl PipelineReporter for NullReporter {}
