//! Load → resample → enrich → validate → emit.

use crate::domain::enrich::{enrich, enrich_par, group_series};
use crate::domain::error::PipelineError;
use crate::domain::ohlcv::DailyRecord;
use crate::domain::record_store::{DuplicatePolicy, RecordStore};
use crate::domain::resample::{resample, resample_par};
use crate::domain::validation::{
    validate, ValidationOutcome, ValidationPolicy, DEFAULT_EXPECTED_LENGTH,
};
use crate::ports::record_source::RecordSource;
use crate::ports::reporter::PipelineReporter;
use crate::ports::series_sink::SeriesSink;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub expected_length: usize,
    pub validation: ValidationPolicy,
    pub duplicates: DuplicatePolicy,
    /// Spread per-instrument resampling and indicator work over a rayon pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            expected_length: DEFAULT_EXPECTED_LENGTH,
            validation: ValidationPolicy::default(),
            duplicates: DuplicatePolicy::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    /// (instrument, destination) for every written series, in instrument order.
    pub written: Vec<(String, String)>,
    pub rejected: BTreeMap<String, usize>,
}

/// Run every in-memory stage. No I/O.
pub fn transform(
    records: Vec<DailyRecord>,
    config: &PipelineConfig,
    reporter: &dyn PipelineReporter,
) -> Result<ValidationOutcome, PipelineError> {
    let store = RecordStore::load(records, config.duplicates, reporter)?;

    let enriched = if config.parallel {
        let monthly = resample_par(&store, reporter)?;
        enrich_par(&monthly, reporter)
    } else {
        let monthly = resample(&store, reporter)?;
        enrich(&monthly, reporter)
    };

    validate(
        group_series(enriched),
        config.expected_length,
        config.validation,
        reporter,
    )
}

/// Full run. Nothing reaches the sink until validation has finished, so a
/// fail-fast rejection leaves no output for any instrument.
pub fn run_pipeline(
    source: &dyn RecordSource,
    sink: &dyn SeriesSink,
    config: &PipelineConfig,
    reporter: &dyn PipelineReporter,
) -> Result<PipelineSummary, PipelineError> {
    let records = source.load_records()?;
    let outcome = transform(records, config, reporter)?;
    check_destinations(sink, outcome.accepted.keys())?;

    let mut written = Vec::with_capacity(outcome.accepted.len());
    for (instrument, series) in &outcome.accepted {
        let destination = sink.write_series(series)?;
        reporter.series_written(instrument, &destination, series.len());
        written.push((instrument.clone(), destination));
    }

    Ok(PipelineSummary {
        written,
        rejected: outcome.rejected,
    })
}

/// Fail before any write if two instruments resolve to the same destination.
pub fn check_destinations<'a>(
    sink: &dyn SeriesSink,
    instruments: impl IntoIterator<Item = &'a String>,
) -> Result<(), PipelineError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for instrument in instruments {
        let destination = sink.destination(instrument);
        if let Some(other) = seen.get(&destination) {
            return Err(PipelineError::Output {
                path: destination,
                reason: format!("instruments {} and {} map to the same file", other, instrument),
            });
        }
        seen.insert(destination, instrument);
    }
    Ok(())
}
