//! Appends SMA/EMA columns to each instrument's monthly bars.
//!
//! Instruments are processed independently; bars must arrive grouped by
//! instrument and ordered by period, as [`crate::domain::resample`] emits them.

use crate::domain::indicator::{IndicatorType, compute_indicators, STANDARD_INDICATORS};
use crate::domain::ohlcv::{EnrichedBar, MonthlyBar};
use crate::ports::reporter::PipelineReporter;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One instrument's enriched bars, ordered by period. Unit of validation and emission.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub instrument_id: String,
    pub bars: Vec<EnrichedBar>,
}

impl InstrumentSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

pub fn enrich(bars: &[MonthlyBar], reporter: &dyn PipelineReporter) -> Vec<EnrichedBar> {
    let groups: Vec<&[MonthlyBar]> = instrument_groups(bars).collect();
    let enriched: Vec<EnrichedBar> = groups
        .iter()
        .flat_map(|group| enrich_instrument(group))
        .collect();
    reporter.indicators_computed(groups.len());
    enriched
}

/// Same output as [`enrich`], one rayon task per instrument.
pub fn enrich_par(bars: &[MonthlyBar], reporter: &dyn PipelineReporter) -> Vec<EnrichedBar> {
    let groups: Vec<&[MonthlyBar]> = instrument_groups(bars).collect();
    let per_instrument: Vec<Vec<EnrichedBar>> = groups
        .par_iter()
        .map(|group| enrich_instrument(group))
        .collect();
    reporter.indicators_computed(groups.len());
    per_instrument.into_iter().flatten().collect()
}

pub fn enrich_instrument(bars: &[MonthlyBar]) -> Vec<EnrichedBar> {
    let indicators = compute_indicators(bars, &STANDARD_INDICATORS);
    let at = |indicator: IndicatorType, i: usize| {
        indicators
            .get(&indicator)
            .and_then(|series| series.value_at(i))
    };

    bars.iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar: bar.clone(),
            sma_10: at(IndicatorType::Sma(10), i),
            sma_20: at(IndicatorType::Sma(20), i),
            ema_10: at(IndicatorType::Ema(10), i),
            ema_20: at(IndicatorType::Ema(20), i),
        })
        .collect()
}

/// Collect enriched bars into per-instrument series keyed by instrument id.
pub fn group_series(bars: Vec<EnrichedBar>) -> BTreeMap<String, InstrumentSeries> {
    let mut series: BTreeMap<String, InstrumentSeries> = BTreeMap::new();
    for bar in bars {
        series
            .entry(bar.bar.instrument_id.clone())
            .or_insert_with(|| InstrumentSeries {
                instrument_id: bar.bar.instrument_id.clone(),
                bars: Vec::new(),
            })
            .bars
            .push(bar);
    }
    series
}

fn instrument_groups(bars: &[MonthlyBar]) -> impl Iterator<Item = &[MonthlyBar]> {
    bars.chunk_by(|a, b| a.instrument_id == b.instrument_id)
}
