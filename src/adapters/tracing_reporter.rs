//! Reporter that forwards pipeline events to `tracing`.

use crate::ports::reporter::PipelineReporter;
use chrono::NaiveDate;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl PipelineReporter for TracingReporter {
    fn records_loaded(&self, records: usize, instruments: usize) {
        tracing::info!(records, instruments, "loaded daily records");
    }

    fn duplicate_replaced(&self, instrument: &str, date: NaiveDate) {
        tracing::warn!(instrument, %date, "duplicate record replaced by later row");
    }

    fn bars_resampled(&self, bars: usize, instruments: usize) {
        tracing::info!(bars, instruments, "monthly resampling complete");
    }

    fn indicators_computed(&self, instruments: usize) {
        tracing::info!(instruments, "indicator calculation complete");
    }

    fn series_accepted(&self, instrument: &str, length: usize) {
        tracing::debug!(instrument, length, "series accepted");
    }

    fn series_rejected(&self, instrument: &str, actual: usize, expected: usize) {
        tracing::error!(
            instrument,
            actual,
            expected,
            "instrument has {} months instead of {}",
            actual,
            expected
        );
    }

    fn series_written(&self, instrument: &str, destination: &str, rows: usize) {
        tracing::info!(instrument, destination, rows, "series written");
    }
}
