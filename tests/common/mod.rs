#![allow(dead_code)]

use chrono::NaiveDate;
use monthbar::domain::enrich::InstrumentSeries;
use monthbar::domain::error::PipelineError;
pub use monthbar::domain::ohlcv::DailyRecord;
use monthbar::ports::record_source::RecordSource;
use monthbar::ports::reporter::PipelineReporter;
use monthbar::ports::series_sink::SeriesSink;
use std::cell::RefCell;

pub struct MockRecordSource {
    pub records: Vec<DailyRecord>,
    pub error: Option<String>,
}

impl MockRecordSource {
    pub fn new(records: Vec<DailyRecord>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl RecordSource for MockRecordSource {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    fn load_records(&self) -> Result<Vec<DailyRecord>, PipelineError> {
        if let Some(reason) = &self.error {
            return Err(PipelineError::Input {
                path: "mock".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.records.clone())
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub written: RefCell<Vec<InstrumentSeries>>,
}

impl SeriesSink for MemorySink {
    fn destination(&self, instrument_id: &str) -> String {
        format!("memory/{}", instrument_id)
    }

    fn write_series(&self, series: &InstrumentSeries) -> Result<String, PipelineError> {
        self.written.borrow_mut().push(series.clone());
        Ok(self.destination(&series.instrument_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loaded { records: usize, instruments: usize },
    Replaced { instrument: String, date: NaiveDate },
    Resampled { bars: usize, instruments: usize },
    Indicators { instruments: usize },
    Accepted { instrument: String, length: usize },
    Rejected { instrument: String, actual: usize, expected: usize },
    Written { instrument: String, rows: usize },
}

#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

impl PipelineReporter for RecordingReporter {
    fn records_loaded(&self, records: usize, instruments: usize) {
        self.events.borrow_mut().push(Event::Loaded {
            records,
            instruments,
        });
    }

    fn duplicate_replaced(&self, instrument: &str, date: NaiveDate) {
        self.events.borrow_mut().push(Event::Replaced {
            instrument: instrument.to_string(),
            date,
        });
    }

    fn bars_resampled(&self, bars: usize, instruments: usize) {
        self.events
            .borrow_mut()
            .push(Event::Resampled { bars, instruments });
    }

    fn indicators_computed(&self, instruments: usize) {
        self.events
            .borrow_mut()
            .push(Event::Indicators { instruments });
    }

    fn series_accepted(&self, instrument: &str, length: usize) {
        self.events.borrow_mut().push(Event::Accepted {
            instrument: instrument.to_string(),
            length,
        });
    }

    fn series_rejected(&self, instrument: &str, actual: usize, expected: usize) {
        self.events.borrow_mut().push(Event::Rejected {
            instrument: instrument.to_string(),
            actual,
            expected,
        });
    }

    fn series_written(&self, instrument: &str, _destination: &str, rows: usize) {
        self.events.borrow_mut().push(Event::Written {
            instrument: instrument.to_string(),
            rows,
        });
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(ticker: &str, day: &str, close: f64) -> DailyRecord {
    DailyRecord {
        instrument_id: ticker.to_string(),
        date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Three trading days (3rd, 14th, 27th) in each of `months` consecutive
/// months starting January 2022. Prices rise steadily from `start_price`.
pub fn generate_months(ticker: &str, months: u32, start_price: f64) -> Vec<DailyRecord> {
    let mut out = Vec::new();
    for m in 0..months {
        let year = 2022 + (m / 12) as i32;
        let month = m % 12 + 1;
        for (k, day) in [3u32, 14, 27].into_iter().enumerate() {
            let close = start_price + m as f64 + k as f64 * 0.25;
            out.push(DailyRecord {
                instrument_id: ticker.to_string(),
                date: date(year, month, day),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000 + k as u64,
            });
        }
    }
    out
}

/// CSV text in the input column layout.
pub fn to_csv(records: &[DailyRecord]) -> String {
    let mut out = String::from("ticker,date,open,high,low,close,volume\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.instrument_id, r.date, r.open, r.high, r.low, r.close, r.volume
        ));
    }
    out
}
