//! Price bar and price series representation.

use chrono::NaiveDateTime;

use super::error::StratsearchError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl PriceBar {
    /// Bar with every price field set to `close`.
    pub fn from_close(index: usize, close: f64) -> Self {
        PriceBar {
            index,
            timestamp: None,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }
}

/// An immutable, non-empty, strictly index-ordered sequence of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    source: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(source: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, StratsearchError> {
        let source = source.into();
        if bars.is_empty() {
            return Err(StratsearchError::EmptySeries {
                source_name: source,
            });
        }

        for pair in bars.windows(2) {
            if pair[1].index <= pair[0].index {
                return Err(StratsearchError::InvalidSeries {
                    source_name: source,
                    reason: format!(
                        "bar index {} follows {} (indices must strictly increase)",
                        pair[1].index, pair[0].index
                    ),
                });
            }
        }

        if let Some(bar) = bars.iter().find(|b| !b.close.is_finite()) {
            return Err(StratsearchError::InvalidSeries {
                source_name: source,
                reason: format!("non-finite close at bar {}", bar.index),
            });
        }

        Ok(PriceSeries { source, bars })
    }

    /// Series built from closes only, indexed 0..n.
    pub fn from_closes(source: impl Into<String>, closes: &[f64]) -> Result<Self, StratsearchError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::from_close(i, close))
            .collect();
        Self::new(source, bars)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
