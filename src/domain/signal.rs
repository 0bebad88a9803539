//! Signal generation: strategy + parameters → aligned buy/sell columns.

use std::collections::BTreeMap;

use crate::domain::error::StratsearchError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::roc::calculate_roc;
use crate::domain::indicator::stochastic::calculate_stochastic;
use crate::domain::indicator::tsi::calculate_tsi;
use crate::domain::indicator::{IndicatorName, IndicatorSeries};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::params::{IndicatorParams, ParameterVector};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalColumn {
    pub buy: Vec<bool>,
    pub sell: Vec<bool>,
}

/// One buy/sell column pair per active indicator, each as long as the series.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    len: usize,
    columns: BTreeMap<IndicatorName, SignalColumn>,
}

impl SignalMatrix {
    pub fn new(len: usize) -> Self {
        SignalMatrix {
            len,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column; both sides must match the matrix length.
    pub fn insert(
        &mut self,
        name: IndicatorName,
        column: SignalColumn,
    ) -> Result<(), StratsearchError> {
        if column.buy.len() != self.len || column.sell.len() != self.len {
            return Err(StratsearchError::IndicatorComputation {
                indicator: name.to_string(),
                reason: format!(
                    "signal length {}/{} does not match series length {}",
                    column.buy.len(),
                    column.sell.len(),
                    self.len
                ),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: IndicatorName) -> Option<&SignalColumn> {
        self.columns.get(&name)
    }

    pub fn indicators(&self) -> impl Iterator<Item = IndicatorName> + '_ {
        self.columns.keys().copied()
    }

    pub fn any_buy(&self, i: usize) -> bool {
        self.columns.values().any(|c| c.buy[i])
    }

    pub fn any_sell(&self, i: usize) -> bool {
        self.columns.values().any(|c| c.sell[i])
    }
}

/// Compute the indicator for one typed parameter set.
pub fn compute_indicator(
    series: &PriceSeries,
    params: &IndicatorParams,
) -> Result<IndicatorSeries, StratsearchError> {
    let bars = series.bars();
    match *params {
        IndicatorParams::Rsi { window, .. } => calculate_rsi(bars, window),
        IndicatorParams::Roc { window, .. } => calculate_roc(bars, window),
        IndicatorParams::Tsi {
            window_slow,
            window_fast,
            ..
        } => calculate_tsi(bars, window_slow, window_fast),
        IndicatorParams::Stoch {
            window,
            smooth_window,
            ..
        } => calculate_stochastic(bars, window, smooth_window),
    }
}

/// Threshold rule: buy below `lower`, sell above `upper`; warmup emits nothing.
pub fn threshold_signals(indicator: &IndicatorSeries, lower: f64, upper: f64) -> SignalColumn {
    let n = indicator.values.len();
    let mut buy = Vec::with_capacity(n);
    let mut sell = Vec::with_capacity(n);
    for i in 0..n {
        match indicator.value_at(i) {
            Some(v) => {
                buy.push(v < lower);
                sell.push(v > upper);
            }
            None => {
                buy.push(false);
                sell.push(false);
            }
        }
    }
    SignalColumn { buy, sell }
}

/// Build the signal matrix for `strategy`.
///
/// Fails with `InvalidParameter` before computing anything if a value the
/// strategy needs is missing or outside its domain.
pub fn generate(
    series: &PriceSeries,
    strategy: &Strategy,
    params: &ParameterVector,
) -> Result<SignalMatrix, StratsearchError> {
    params.validate(strategy)?;

    let mut matrix = SignalMatrix::new(series.len());
    for name in strategy.indicators() {
        let typed = IndicatorParams::from_vector(name, params)?;
        let indicator = compute_indicator(series, &typed)?;
        let (lower, upper) = typed.thresholds();
        matrix.insert(name, threshold_signals(&indicator, lower, upper))?;
    }
    Ok(matrix)
}
