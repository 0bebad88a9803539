//! Stochastic oscillator.
//!
//! %K[i] = (C[i] - LL) / (HH - LL) * 100 over the last `window` bars
//! (50 when HH == LL). %D is the `smooth`-bar SMA of %K.
//! Warmup: window + smooth - 2 bars invalid.

use crate::domain::error::StratsearchError;
use crate::domain::indicator::ema::sma;
use crate::domain::indicator::{
    check_window, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_stochastic(
    bars: &[PriceBar],
    window: usize,
    smooth: usize,
) -> Result<IndicatorSeries, StratsearchError> {
    let indicator_type = IndicatorType::Stochastic { window, smooth };
    check_window(&indicator_type, window, bars.len())?;
    check_window(&indicator_type, smooth, bars.len())?;

    let k_line: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &bars[i + 1 - window..=i];
            let highest = slice.iter().fold(f64::NEG_INFINITY, |a, b| a.max(b.high));
            let lowest = slice.iter().fold(f64::INFINITY, |a, b| a.min(b.low));
            let range = highest - lowest;
            if range.abs() < 1e-10 {
                Some(50.0)
            } else {
                Some((bars[i].close - lowest) / range * 100.0)
            }
        })
        .collect();

    let d_line = sma(&k_line, smooth);

    let values = bars
        .iter()
        .zip(k_line.iter().zip(d_line.iter()))
        .map(|(bar, (k, d))| match (k, d) {
            (Some(k), Some(d)) => IndicatorPoint {
                index: bar.index,
                valid: true,
                value: IndicatorValue::Stochastic { k: *k, d: *d },
            },
            _ => IndicatorPoint {
                index: bar.index,
                valid: false,
                value: IndicatorValue::Stochastic { k: 0.0, d: 0.0 },
            },
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}
