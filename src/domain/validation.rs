//! Fixed-length gate on enriched series.
//!
//! Downstream consumers assume every instrument covers the same number of
//! months, so a series is accepted only if its length equals `expected_length`.

use crate::domain::enrich::InstrumentSeries;
use crate::domain::error::PipelineError;
use crate::ports::reporter::PipelineReporter;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Two years of monthly bars.
pub const DEFAULT_EXPECTED_LENGTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Abort on the first instrument whose length is wrong.
    #[default]
    FailFast,
    /// Check every instrument and return both partitions.
    CollectAll,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(ValidationPolicy::FailFast),
            "collect_all" | "collect-all" => Ok(ValidationPolicy::CollectAll),
            other => Err(format!(
                "unknown validation policy '{other}' (expected fail_fast or collect_all)"
            )),
        }
    }
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationPolicy::FailFast => write!(f, "fail_fast"),
            ValidationPolicy::CollectAll => write!(f, "collect_all"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub accepted: BTreeMap<String, InstrumentSeries>,
    /// Rejected instrument id → actual series length.
    pub rejected: BTreeMap<String, usize>,
}

/// Partition instruments by series length, in ascending instrument order.
///
/// Under [`ValidationPolicy::FailFast`] the first mismatch is returned as
/// [`PipelineError::IncompleteSeries`] and nothing is accepted.
pub fn validate(
    series_by_instrument: BTreeMap<String, InstrumentSeries>,
    expected_length: usize,
    policy: ValidationPolicy,
    reporter: &dyn PipelineReporter,
) -> Result<ValidationOutcome, PipelineError> {
    let mut outcome = ValidationOutcome::default();

    for (instrument, series) in series_by_instrument {
        let actual = series.len();
        if actual == expected_length {
            reporter.series_accepted(&instrument, actual);
            outcome.accepted.insert(instrument, series);
            continue;
        }

        reporter.series_rejected(&instrument, actual, expected_length);
        match policy {
            ValidationPolicy::FailFast => {
                return Err(PipelineError::IncompleteSeries {
                    instrument,
                    actual,
                    expected: expected_length,
                });
            }
            ValidationPolicy::CollectAll => {
                outcome.rejected.insert(instrument, actual);
            }
        }
    }

    Ok(outcome)
}
