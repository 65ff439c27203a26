//! Trend indicators over a monthly close series.
//!
//! - `IndicatorPoint`: one period's value, `None` during warmup
//! - `IndicatorType`: indicator identity + window (serves as HashMap key)
//! - `IndicatorSeries`: the values of one indicator for one instrument

pub mod ema;
pub mod sma;

use crate::domain::ohlcv::{MonthlyBar, Period};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub period: Period,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
}

/// The indicator columns every emitted series carries, in column order.
pub const STANDARD_INDICATORS: [IndicatorType; 4] = [
    IndicatorType::Sma(10),
    IndicatorType::Sma(20),
    IndicatorType::Ema(10),
    IndicatorType::Ema(20),
];

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }
}

/// Column header used in emitted tables, e.g. `SMA_10`.
impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(window) => write!(f, "SMA_{}", window),
            IndicatorType::Ema(span) => write!(f, "EMA_{}", span),
        }
    }
}

pub fn calculate(bars: &[MonthlyBar], indicator: IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(window) => sma::calculate_sma(bars, window),
        IndicatorType::Ema(span) => ema::calculate_ema(bars, span),
    }
}

/// Compute each requested indicator over one instrument's bars.
pub fn compute_indicators(
    bars: &[MonthlyBar],
    indicators: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    indicators
        .iter()
        .map(|&indicator| (indicator, calculate(bars, indicator)))
        .collect()
}
