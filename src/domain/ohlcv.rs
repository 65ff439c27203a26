//! Daily records, calendar-month periods and the bars built from them.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// One day of price/volume data for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub instrument_id: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyRecord {
    pub fn period(&self) -> Period {
        Period::containing(self.date)
    }
}

/// A calendar month. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Last calendar day of the month; `None` outside chrono's representable range.
    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)?
            .checked_add_months(Months::new(1))?
            .pred_opt()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// OHLCV summary of one instrument over one calendar month.
///
/// `date` is the last calendar day of `period`, which is how the period is
/// labelled in emitted tables.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBar {
    pub instrument_id: String,
    pub period: Period,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A monthly bar with its trend indicators. `None` marks insufficient history.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub bar: MonthlyBar,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_10: Option<f64>,
    pub ema_20: Option<f64>,
}

impl EnrichedBar {
    pub fn instrument_id(&self) -> &str {
        &self.bar.instrument_id
    }
}
