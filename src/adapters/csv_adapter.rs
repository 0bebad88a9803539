//! CSV price file adapter.
//!
//! Columns are located by header name, case-insensitively. `Close` is
//! required; `Open`, `High`, `Low`, `Volume` and a `Date`/`Datetime`/
//! `Timestamp` column are optional. A row with an empty, unparseable or NaN
//! price or volume is dropped, and bars are indexed by their position after
//! cleaning. A timestamp that cannot be read leaves the bar undated.

use std::fs;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::error::StratsearchError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::PriceDataPort;

const TIMESTAMP_HEADERS: [&str; 4] = ["datetime", "date", "timestamp", "time"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        CsvAdapter
    }

    /// Parse CSV text already in memory; `source` names it in errors.
    pub fn parse(&self, source: &str, content: &str) -> Result<PriceSeries, StratsearchError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| StratsearchError::Data {
            reason: format!("{}: cannot read header row: {}", source, e),
        })?;
        let columns = Columns::locate(headers).ok_or_else(|| StratsearchError::Data {
            reason: format!("{}: no Close column in header", source),
        })?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| StratsearchError::Data {
                reason: format!("{}: CSV parse error: {}", source, e),
            })?;
            match columns.bar(&record, bars.len()) {
                Some(bar) => bars.push(bar),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(source, dropped, kept = bars.len(), "dropped incomplete rows");
        }
        PriceSeries::new(source, bars)
    }
}

impl PriceDataPort for CsvAdapter {
    fn load_series(&self, source: &str) -> Result<PriceSeries, StratsearchError> {
        let content = fs::read_to_string(source).map_err(|e| StratsearchError::Data {
            reason: format!("failed to read {}: {}", source, e),
        })?;
        self.parse(source, &content)
    }
}

/// Field positions of the recognised columns.
struct Columns {
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
    timestamp: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Some(Columns {
            close: find("close")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
            timestamp: TIMESTAMP_HEADERS.iter().find_map(|&h| find(h)),
        })
    }

    fn bar(&self, record: &csv::StringRecord, index: usize) -> Option<PriceBar> {
        let close = number(record, self.close)?;
        let open = optional(record, self.open)?.unwrap_or(close);
        let high = optional(record, self.high)?.unwrap_or(close);
        let low = optional(record, self.low)?.unwrap_or(close);
        let volume = optional(record, self.volume)?;
        let timestamp = self
            .timestamp
            .and_then(|i| record.get(i))
            .and_then(parse_timestamp);
        Some(PriceBar {
            index,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

fn number(record: &csv::StringRecord, i: usize) -> Option<f64> {
    record
        .get(i)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// `Some(None)` when the column is absent, `None` when present but unusable.
fn optional(record: &csv::StringRecord, column: Option<usize>) -> Option<Option<f64>> {
    match column {
        Some(i) => number(record, i).map(Some),
        None => Some(None),
    }
}

/// Naive, offset-qualified (normalised to UTC) or Unix-epoch seconds.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            DateTime::parse_from_str(s, OFFSET_FORMAT)
                .or_else(|_| DateTime::parse_from_rfc3339(s))
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            s.parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc())
        })
}
