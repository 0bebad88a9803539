#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use stratsearch::domain::error::StratsearchError;
use stratsearch::domain::ohlcv::PriceSeries;
use stratsearch::domain::params::{ParamValue, ParameterVector};
use stratsearch::ports::data_port::PriceDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, source: &str, closes: &[f64]) -> Self {
        let series = PriceSeries::from_closes(source, closes).unwrap();
        self.data.insert(source.to_string(), series);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn load_series(&self, source: &str) -> Result<PriceSeries, StratsearchError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(StratsearchError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(source)
            .cloned()
            .ok_or_else(|| StratsearchError::EmptySeries {
                source_name: source.to_string(),
            })
    }
}

/// Oscillating closes with a slow drift, long enough for every window.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + (t * 0.21).sin() * 9.0 + (t * 0.05).cos() * 4.0 + t * 0.02
        })
        .collect()
}

pub fn wave_series(n: usize) -> PriceSeries {
    PriceSeries::from_closes("wave", &wave_closes(n)).unwrap()
}

pub fn write_csv(dir: &Path, name: &str, closes: &[f64]) -> PathBuf {
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for (i, close) in closes.iter().enumerate() {
        let day = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
            + chrono::Duration::days(i as i64);
        content.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4},{}\n",
            day.format("%Y-%m-%d"),
            close,
            close + 0.5,
            close - 0.5,
            close,
            1000 + i
        ));
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn trade_vector(n_shares: i64, stop_loss: f64, take_profit: f64) -> ParameterVector {
    ParameterVector::new()
        .with("n_shares", ParamValue::Int(n_shares))
        .with("stop_loss", ParamValue::Float(stop_loss))
        .with("take_profit", ParamValue::Float(take_profit))
}
