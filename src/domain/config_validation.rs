//! Configuration validation.
//!
//! Validates every config field before a run starts.

use crate::domain::error::PipelineError;
use crate::domain::record_store::DuplicatePolicy;
use crate::domain::validation::ValidationPolicy;
use crate::ports::config_port::ConfigPort;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    validate_expected_length(config)?;
    validate_policy::<ValidationPolicy>(config, "validation")?;
    validate_policy::<DuplicatePolicy>(config, "duplicates")?;
    validate_parallel(config)?;
    validate_non_empty(config, "input", "path")?;
    validate_non_empty(config, "output", "dir")?;
    validate_prefix(config)?;
    Ok(())
}

fn validate_expected_length(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    let Some(raw) = config.get_string("pipeline", "expected_length") else {
        return Ok(());
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(PipelineError::ConfigInvalid {
            section: "pipeline".to_string(),
            key: "expected_length".to_string(),
            reason: format!("expected_length must be a positive integer, got '{}'", raw),
        }),
    }
}

fn validate_policy<P>(config: &dyn ConfigPort, key: &str) -> Result<(), PipelineError>
where
    P: std::str::FromStr<Err = String>,
{
    match config.get_string("pipeline", key) {
        Some(raw) => raw
            .parse::<P>()
            .map(|_| ())
            .map_err(|reason| PipelineError::ConfigInvalid {
                section: "pipeline".to_string(),
                key: key.to_string(),
                reason,
            }),
        None => Ok(()),
    }
}

fn validate_parallel(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    match config.get_string("pipeline", "parallel") {
        Some(raw)
            if !matches!(
                raw.trim().to_lowercase().as_str(),
                "true" | "yes" | "1" | "false" | "no" | "0"
            ) =>
        {
            Err(PipelineError::ConfigInvalid {
                section: "pipeline".to_string(),
                key: "parallel".to_string(),
                reason: format!("parallel must be a boolean, got '{}'", raw),
            })
        }
        _ => Ok(()),
    }
}

fn validate_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), PipelineError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().is_empty() => Err(PipelineError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must not be empty", key),
        }),
        _ => Ok(()),
    }
}

fn validate_prefix(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    match config.get_string("output", "prefix") {
        Some(p) if p.contains('/') || p.contains('\\') => Err(PipelineError::ConfigInvalid {
            section: "output".to_string(),
            key: "prefix".to_string(),
            reason: "prefix must not contain path separators".to_string(),
        }),
        _ => Ok(()),
    }
}
