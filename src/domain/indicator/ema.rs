//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every bar has a value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::MonthlyBar;

pub fn calculate_ema(bars: &[MonthlyBar], span: usize) -> IndicatorSeries {
    if span == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = smoothing_factor(span);
    let mut ema = bars[0].close;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            ema = bar.close * k + ema * (1.0 - k);
        }
        values.push(IndicatorPoint {
            period: bar.period,
            value: Some(ema),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}
