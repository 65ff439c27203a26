//! Output port for accepted instrument series.

use crate::domain::enrich::InstrumentSeries;
use crate::domain::error::PipelineError;

pub trait SeriesSink {
    /// Where `instrument_id` would be written. Distinct instruments must not share one.
    fn destination(&self, instrument_id: &str) -> String;

    /// Persist one instrument's series. Returns a description of the destination.
    fn write_series(&self, series: &InstrumentSeries) -> Result<String, PipelineError>;
}
