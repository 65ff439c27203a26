//! Daily records to calendar-month OHLCV bars.
//!
//! Per (instrument, month): open of the first day, max high, min low, close of
//! the last day, summed volume. Months without records produce no bar.

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::{DailyRecord, MonthlyBar, Period};
use crate::domain::record_store::RecordStore;
use crate::ports::reporter::PipelineReporter;
use rayon::prelude::*;

pub fn resample(
    store: &RecordStore,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<MonthlyBar>, PipelineError> {
    let mut bars = Vec::new();
    for partition in store.partitions() {
        bars.extend(resample_instrument(partition)?);
    }
    reporter.bars_resampled(bars.len(), store.instrument_count());
    Ok(bars)
}

/// Same output as [`resample`], one rayon task per instrument.
pub fn resample_par(
    store: &RecordStore,
    reporter: &dyn PipelineReporter,
) -> Result<Vec<MonthlyBar>, PipelineError> {
    let partitions: Vec<&[DailyRecord]> = store.partitions().collect();
    let per_instrument = partitions
        .par_iter()
        .map(|partition| resample_instrument(partition))
        .collect::<Result<Vec<_>, _>>()?;

    let bars: Vec<MonthlyBar> = per_instrument.into_iter().flatten().collect();
    reporter.bars_resampled(bars.len(), partitions.len());
    Ok(bars)
}

/// Resample one instrument's records, which must be date-ordered.
pub fn resample_instrument(records: &[DailyRecord]) -> Result<Vec<MonthlyBar>, PipelineError> {
    records
        .chunk_by(|a, b| a.period() == b.period())
        .map(reduce_month)
        .collect()
}

fn reduce_month(days: &[DailyRecord]) -> Result<MonthlyBar, PipelineError> {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Err(PipelineError::Aggregation {
            instrument: "?".into(),
            period: "?".into(),
            reason: "empty month partition".into(),
        });
    };
    let period = Period::containing(first.date);
    let fail = |reason: String| PipelineError::Aggregation {
        instrument: first.instrument_id.clone(),
        period: period.to_string(),
        reason,
    };

    let date = period
        .last_day()
        .ok_or_else(|| fail("month end is out of the supported date range".into()))?;

    let high = days.iter().map(|d| d.high).fold(f64::NEG_INFINITY, f64::max);
    let low = days.iter().map(|d| d.low).fold(f64::INFINITY, f64::min);
    if !high.is_finite() || !low.is_finite() {
        return Err(fail(format!("non-finite range (high {high}, low {low})")));
    }

    let volume = days
        .iter()
        .try_fold(0u64, |acc, d| acc.checked_add(d.volume))
        .ok_or_else(|| fail("volume sum overflows".into()))?;

    Ok(MonthlyBar {
        instrument_id: first.instrument_id.clone(),
        period,
        date,
        open: first.open,
        high,
        low,
        close: last.close,
        volume,
    })
}
