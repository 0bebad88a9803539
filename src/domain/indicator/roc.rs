//! ROC (Rate of Change) indicator implementation.
//!
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0: ROC = 0
//! Warmup: first n bars invalid.

use crate::domain::error::StratsearchError;
use crate::domain::indicator::{
    check_window, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_roc(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, StratsearchError> {
    let indicator_type = IndicatorType::Roc(period);
    check_window(&indicator_type, period, bars.len())?;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = i >= period;
            let value = if valid {
                let prev_close = bars[i - period].close;
                if prev_close == 0.0 {
                    0.0
                } else {
                    ((bar.close - prev_close) / prev_close) * 100.0
                }
            } else {
                0.0
            };

            IndicatorPoint {
                index: bar.index,
                valid,
                value: IndicatorValue::Simple(value),
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::from_close(i, close))
            .collect()
    }

    #[test]
    fn roc_warmup() {
        let series = calculate_roc(&make_bars(&[100.0, 105.0, 110.0, 115.0, 120.0]), 3).unwrap();

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn roc_basic_calculation() {
        let series = calculate_roc(&make_bars(&[100.0, 105.0, 110.0, 115.0]), 2).unwrap();

        let expected = ((110.0 - 100.0) / 100.0) * 100.0;
        assert!((series.value_at(2).unwrap() - expected).abs() < f64::EPSILON);

        let expected = ((115.0 - 105.0) / 105.0) * 100.0;
        assert!((series.value_at(3).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_zero_division() {
        let series = calculate_roc(&make_bars(&[0.0, 100.0, 110.0]), 2).unwrap();
        assert_eq!(series.value_at(2), Some(0.0));
    }

    #[test]
    fn roc_negative_change() {
        let series = calculate_roc(&make_bars(&[100.0, 90.0, 80.0]), 2).unwrap();
        let v = series.value_at(2).unwrap();
        assert!((v - (-20.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_window_exceeds_series() {
        let err = calculate_roc(&make_bars(&[100.0, 105.0]), 10).unwrap_err();
        assert!(err.to_string().contains("ROC(10)"));
    }
}
