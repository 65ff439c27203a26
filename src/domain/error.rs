//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for monthbar.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed record at {location}: {reason}")]
    MalformedRecord { location: String, reason: String },

    #[error("duplicate record for {instrument} on {date}")]
    DuplicateRecord { instrument: String, date: NaiveDate },

    #[error("aggregation failed for {instrument} in {period}: {reason}")]
    Aggregation {
        instrument: String,
        period: String,
        reason: String,
    },

    #[error("incomplete series for {instrument}: have {actual} months, expected {expected}")]
    IncompleteSeries {
        instrument: String,
        actual: usize,
        expected: usize,
    },

    #[error("failed to read input {path}: {reason}")]
    Input { path: String, reason: String },

    #[error("failed to write output {path}: {reason}")]
    Output { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },
}

impl From<&PipelineError> for std::process::ExitCode {
    fn from(err: &PipelineError) -> Self {
        let code: u8 = match err {
            PipelineError::Input { .. } | PipelineError::Output { .. } => 1,
            PipelineError::ConfigParse { .. } | PipelineError::ConfigInvalid { .. } => 2,
            PipelineError::MalformedRecord { .. } | PipelineError::DuplicateRecord { .. } => 3,
            PipelineError::Aggregation { .. } => 4,
            PipelineError::IncompleteSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
