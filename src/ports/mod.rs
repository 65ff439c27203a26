//! Port traits (hexagonal architecture boundaries).

pub mod config_port;
pub mod record_source;
pub mod reporter;
pub mod series_sink;
