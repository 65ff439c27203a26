//! Core domain types and logic.

pub mod ohlcv;
pub mod record_store;
pub mod resample;
pub mod indicator;
pub mod enrich;
pub mod validation;
pub mod pipeline;
pub mod config_validation;
pub mod error;
