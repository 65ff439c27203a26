//! CSV file adapters: daily record source and per-instrument result sink.

use crate::domain::enrich::InstrumentSeries;
use crate::domain::error::PipelineError;
use crate::domain::indicator::STANDARD_INDICATORS;
use crate::domain::ohlcv::DailyRecord;
use crate::ports::record_source::RecordSource;
use crate::ports::series_sink::SeriesSink;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PREFIX: &str = "result_";

const INPUT_COLUMNS: [&str; 7] = ["ticker", "date", "open", "high", "low", "close", "volume"];

/// Reads `ticker,date,open,high,low,close,volume` rows. Columns are located
/// by header name; order and extra columns don't matter.
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn parse(content: &str) -> Result<Vec<DailyRecord>, PipelineError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| PipelineError::MalformedRecord {
                location: "header".into(),
                reason: format!("CSV parse error: {}", e),
            })?
            .clone();
        let mut index = [0usize; 7];
        for (slot, name) in index.iter_mut().zip(INPUT_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| PipelineError::MalformedRecord {
                    location: "header".into(),
                    reason: format!("missing {} column", name),
                })?;
        }
        let [ticker, date, open, high, low, close, volume] = index;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let location = format!("data row {}", row + 1);
            let record = result.map_err(|e| PipelineError::MalformedRecord {
                location: location.clone(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let field = |i: usize, name: &str| {
                record
                    .get(i)
                    .map(str::trim)
                    .ok_or_else(|| PipelineError::MalformedRecord {
                        location: location.clone(),
                        reason: format!("missing {} value", name),
                    })
            };
            let malformed = |reason: String| PipelineError::MalformedRecord {
                location: location.clone(),
                reason,
            };

            let instrument_id = field(ticker, "ticker")?.to_string();
            let raw_date = field(date, "date")?;
            let date = parse_date(raw_date)
                .ok_or_else(|| malformed(format!("invalid date '{}'", raw_date)))?;

            let price = |i: usize, name: &str| -> Result<f64, PipelineError> {
                let raw = field(i, name)?;
                raw.parse::<f64>()
                    .map_err(|e| malformed(format!("invalid {} value '{}': {}", name, raw, e)))
            };

            let raw_volume = field(volume, "volume")?;
            let volume = parse_volume(raw_volume)
                .ok_or_else(|| malformed(format!("invalid volume value '{}'", raw_volume)))?;

            records.push(DailyRecord {
                instrument_id,
                date,
                open: price(open, "open")?,
                high: price(high, "high")?,
                low: price(low, "low")?,
                close: price(close, "close")?,
                volume,
            });
        }

        Ok(records)
    }
}

impl RecordSource for CsvRecordSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_records(&self) -> Result<Vec<DailyRecord>, PipelineError> {
        let content = fs::read_to_string(&self.path).map_err(|e| PipelineError::Input {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day which is discarded.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// Non-negative integer; an integral float such as `1500.0` is accepted.
fn parse_volume(raw: &str) -> Option<u64> {
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

/// Writes one `<prefix><ticker>.csv` per instrument into `dir`.
pub struct CsvSeriesSink {
    dir: PathBuf,
    prefix: String,
}

impl CsvSeriesSink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn path_for(&self, instrument_id: &str) -> PathBuf {
        let safe: String = instrument_id
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}{}.csv", self.prefix, safe))
    }
}

pub fn header_row() -> Vec<String> {
    let mut header: Vec<String> = ["ticker", "date", "open", "high", "low", "close", "volume"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(STANDARD_INDICATORS.iter().map(|i| i.to_string()));
    header
}

/// Shortest representation that round-trips, always with a decimal point.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

impl SeriesSink for CsvSeriesSink {
    fn destination(&self, instrument_id: &str) -> String {
        self.path_for(instrument_id).display().to_string()
    }

    fn write_series(&self, series: &InstrumentSeries) -> Result<String, PipelineError> {
        let path = self.path_for(&series.instrument_id);
        let output_err = |reason: String| PipelineError::Output {
            path: path.display().to_string(),
            reason,
        };

        fs::create_dir_all(&self.dir).map_err(|e| output_err(e.to_string()))?;
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| output_err(e.to_string()))?;

        wtr.write_record(header_row())
            .map_err(|e| output_err(e.to_string()))?;
        for enriched in &series.bars {
            let bar = &enriched.bar;
            wtr.write_record([
                bar.instrument_id.clone(),
                bar.date.format("%Y-%m-%d").to_string(),
                format_float(bar.open),
                format_float(bar.high),
                format_float(bar.low),
                format_float(bar.close),
                bar.volume.to_string(),
                format_optional(enriched.sma_10),
                format_optional(enriched.sma_20),
                format_optional(enriched.ema_10),
                format_optional(enriched.ema_20),
            ])
            .map_err(|e| output_err(e.to_string()))?;
        }
        wtr.flush().map_err(|e| output_err(e.to_string()))?;

        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::{EnrichedBar, MonthlyBar, Period};
    use tempfile::TempDir;

    const INPUT: &str = "ticker,date,open,high,low,close,volume\n\
        AAPL,2024-01-15,100.0,110.0,90.0,105.0,50000\n\
        AAPL,2024-01-16,105.0,115.0,100.0,110.0,60000\n\
        MSFT,2024-01-16,300.5,310.0,299.0,305.25,1200\n";

    fn series(id: &str) -> InstrumentSeries {
        let period = Period { year: 2024, month: 1 };
        InstrumentSeries {
            instrument_id: id.into(),
            bars: vec![EnrichedBar {
                bar: MonthlyBar {
                    instrument_id: id.into(),
                    period,
                    date: period.last_day().unwrap(),
                    open: 100.0,
                    high: 115.0,
                    low: 90.0,
                    close: 110.0,
                    volume: 110000,
                },
                sma_10: None,
                sma_20: None,
                ema_10: Some(110.0),
                ema_20: Some(0.1),
            }],
        }
    }

    #[test]
    fn parse_reads_all_rows() {
        let records = CsvRecordSource::parse(INPUT).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].instrument_id, "AAPL");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(records[0].open, 100.0);
        assert_eq!(records[0].high, 110.0);
        assert_eq!(records[0].low, 90.0);
        assert_eq!(records[0].close, 105.0);
        assert_eq!(records[0].volume, 50000);
        assert_eq!(records[2].close, 305.25);
    }

    #[test]
    fn parse_locates_columns_by_header() {
        let content = "Date,Volume,Close,Low,High,Open,Ticker,Adj Close\n\
            2024-02-01,10,4.0,3.0,5.0,3.5,XYZ,3.9\n";
        let records = CsvRecordSource::parse(content).unwrap();
        assert_eq!(records[0].instrument_id, "XYZ");
        assert_eq!(records[0].open, 3.5);
        assert_eq!(records[0].close, 4.0);
        assert_eq!(records[0].volume, 10);
    }

    #[test]
    fn parse_accepts_timestamp_and_float_volume() {
        let content = "ticker,date,open,high,low,close,volume\n\
            AAPL,2024-01-15 00:00:00,1,2,0.5,1.5,1500.0\n";
        let records = CsvRecordSource::parse(content).unwrap();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(records[0].volume, 1500);
    }

    #[test]
    fn missing_column_is_malformed() {
        let content = "ticker,date,open,high,low,close\nAAPL,2024-01-15,1,2,0.5,1.5\n";
        match CsvRecordSource::parse(content) {
            Err(PipelineError::MalformedRecord { location, reason }) => {
                assert_eq!(location, "header");
                assert!(reason.contains("volume"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_names_row() {
        let content = "ticker,date,open,high,low,close,volume\n\
            AAPL,2024-01-15,1,2,0.5,1.5,10\n\
            AAPL,15/01/2024,1,2,0.5,1.5,10\n";
        match CsvRecordSource::parse(content) {
            Err(PipelineError::MalformedRecord { location, reason }) => {
                assert_eq!(location, "data row 2");
                assert!(reason.contains("15/01/2024"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_price_is_malformed() {
        let content = "ticker,date,open,high,low,close,volume\nAAPL,2024-01-15,1,2,0.5,n/a,10\n";
        assert!(matches!(
            CsvRecordSource::parse(content),
            Err(PipelineError::MalformedRecord { reason, .. }) if reason.contains("close")
        ));
    }

    #[test]
    fn negative_or_fractional_volume_is_malformed() {
        for volume in ["-5", "10.5"] {
            let content = format!(
                "ticker,date,open,high,low,close,volume\nAAPL,2024-01-15,1,2,0.5,1,{}\n",
                volume
            );
            assert!(matches!(
                CsvRecordSource::parse(&content),
                Err(PipelineError::MalformedRecord { .. })
            ));
        }
    }

    #[test]
    fn volume_beyond_u64_range_is_malformed() {
        for volume in ["18446744073709551616", "18446744073709551616.0", "1e20"] {
            let content = format!(
                "ticker,date,open,high,low,close,volume\nAAPL,2024-01-15,1,2,0.5,1,{}\n",
                volume
            );
            assert!(matches!(
                CsvRecordSource::parse(&content),
                Err(PipelineError::MalformedRecord { reason, .. }) if reason.contains("volume")
            ));
        }
    }

    #[test]
    fn load_records_missing_file_is_input_error() {
        let source = CsvRecordSource::new(PathBuf::from("/nonexistent/input.csv"));
        assert!(matches!(
            source.load_records(),
            Err(PipelineError::Input { .. })
        ));
    }

    #[test]
    fn load_records_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, INPUT).unwrap();

        let source = CsvRecordSource::new(path.clone());
        assert_eq!(source.load_records().unwrap().len(), 3);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn sink_writes_column_contract() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSeriesSink::new(dir.path().join("out"));

        let written = sink.write_series(&series("AAPL")).unwrap();
        let content = fs::read_to_string(&written).unwrap();

        assert!(written.ends_with("result_AAPL.csv"));
        assert_eq!(
            content,
            "ticker,date,open,high,low,close,volume,SMA_10,SMA_20,EMA_10,EMA_20\n\
             AAPL,2024-01-31,100.0,115.0,90.0,110.0,110000,,,110.0,0.1\n"
        );
    }

    #[test]
    fn sink_prefix_and_unsafe_ticker() {
        let sink = CsvSeriesSink::new(PathBuf::from("out")).with_prefix("bars_");
        assert_eq!(sink.path_for("BRK/B"), PathBuf::from("out/bars_BRK_B.csv"));
        assert_eq!(sink.destination("BRK/B"), sink.path_for("BRK/B").display().to_string());
    }

    #[test]
    fn format_float_keeps_decimal_point() {
        assert_eq!(format_float(105.0), "105.0");
        assert_eq!(format_float(5.5), "5.5");
        assert_eq!(format_optional(None), "");
    }
}
