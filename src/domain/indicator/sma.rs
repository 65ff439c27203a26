//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (C[i-n+1] + ... + C[i]) / n
//! Warmup: first (n-1) bars are `None`.
//!
//! Each window is summed afresh, left to right, so a value never depends on
//! floating-point drift from earlier windows.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::MonthlyBar;

pub fn calculate_sma(bars: &[MonthlyBar], window: usize) -> IndicatorSeries {
    if window == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(window),
            values: Vec::new(),
        };
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = if i + 1 >= window {
                let sum: f64 = bars[i + 1 - window..=i].iter().map(|b| b.close).sum();
                Some(sum / window as f64)
            } else {
                None
            };
            IndicatorPoint {
                period: bar.period,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(window),
        values,
    }
}
