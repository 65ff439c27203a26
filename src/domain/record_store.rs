//! Loaded daily records, sorted by (instrument, date).
//!
//! The store is the only way into the resampler, so every invariant the later
//! stages rely on is checked here: non-empty instrument ids, finite prices and
//! at most one record per instrument per day.

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::DailyRecord;
use crate::ports::reporter::PipelineReporter;
use std::fmt;
use std::str::FromStr;

/// What to do when two records share an instrument and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the load with [`PipelineError::DuplicateRecord`].
    #[default]
    Reject,
    /// Keep the record that appears last in the input.
    LastWins,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "last_wins" | "last-wins" => Ok(DuplicatePolicy::LastWins),
            other => Err(format!(
                "unknown duplicate policy '{other}' (expected reject or last_wins)"
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Reject => write!(f, "reject"),
            DuplicatePolicy::LastWins => write!(f, "last_wins"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<DailyRecord>,
}

impl RecordStore {
    pub fn load<I>(
        records: I,
        duplicates: DuplicatePolicy,
        reporter: &dyn PipelineReporter,
    ) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let mut records: Vec<DailyRecord> = records.into_iter().collect();
        for record in &records {
            check_record(record)?;
        }

        // Stable: duplicates keep their input order, so the last one wins below.
        records.sort_by(|a, b| {
            a.instrument_id
                .cmp(&b.instrument_id)
                .then(a.date.cmp(&b.date))
        });

        let mut deduped: Vec<DailyRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(prev)
                    if prev.instrument_id == record.instrument_id && prev.date == record.date =>
                {
                    match duplicates {
                        DuplicatePolicy::Reject => {
                            return Err(PipelineError::DuplicateRecord {
                                instrument: record.instrument_id,
                                date: record.date,
                            });
                        }
                        DuplicatePolicy::LastWins => {
                            reporter.duplicate_replaced(&record.instrument_id, record.date);
                            *prev = record;
                        }
                    }
                }
                _ => deduped.push(record),
            }
        }

        let store = Self { records: deduped };
        reporter.records_loaded(store.len(), store.instrument_count());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Contiguous per-instrument slices, in ascending instrument order.
    pub fn partitions(&self) -> impl Iterator<Item = &[DailyRecord]> {
        self.records
            .chunk_by(|a, b| a.instrument_id == b.instrument_id)
    }

    pub fn instrument_count(&self) -> usize {
        self.partitions().count()
    }
}

fn check_record(record: &DailyRecord) -> Result<(), PipelineError> {
    if record.instrument_id.trim().is_empty() {
        return Err(PipelineError::MalformedRecord {
            location: format!("record dated {}", record.date),
            reason: "empty instrument id".into(),
        });
    }

    let prices = [
        ("open", record.open),
        ("high", record.high),
        ("low", record.low),
        ("close", record.close),
    ];
    for (field, value) in prices {
        if !value.is_finite() {
            return Err(PipelineError::MalformedRecord {
                location: format!("{} {}", record.instrument_id, record.date),
                reason: format!("{field} is not a finite number ({value})"),
            });
        }
    }
    Ok(())
}
