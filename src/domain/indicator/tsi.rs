//! True Strength Index.
//!
//! TSI = 100 * EMA_fast(EMA_slow(pc)) / EMA_fast(EMA_slow(|pc|)), where
//! pc[i] = C[i] - C[i-1]. The first smoothing runs over `slow`, the second
//! over `fast`. Bars where the double-smoothed absolute change is zero are
//! invalid.

use crate::domain::error::StratsearchError;
use crate::domain::indicator::ema::ema;
use crate::domain::indicator::{
    check_window, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_tsi(
    bars: &[PriceBar],
    slow: usize,
    fast: usize,
) -> Result<IndicatorSeries, StratsearchError> {
    let indicator_type = IndicatorType::Tsi { slow, fast };
    check_window(&indicator_type, slow, bars.len())?;
    check_window(&indicator_type, fast, bars.len())?;
    // first defined value lands at bar slow + fast - 1
    check_window(&indicator_type, slow + fast, bars.len())?;

    let changes: Vec<Option<f64>> = std::iter::once(None)
        .chain(bars.windows(2).map(|w| Some(w[1].close - w[0].close)))
        .collect();
    let abs_changes: Vec<Option<f64>> = changes.iter().map(|c| c.map(f64::abs)).collect();

    let smoothed = ema(&ema(&changes, slow), fast);
    let abs_smoothed = ema(&ema(&abs_changes, slow), fast);

    let values = bars
        .iter()
        .zip(smoothed.iter().zip(abs_smoothed.iter()))
        .map(|(bar, pair)| {
            let tsi = match pair {
                (Some(pc), Some(apc)) if *apc != 0.0 => Some(100.0 * pc / apc),
                _ => None,
            };
            IndicatorPoint {
                index: bar.index,
                valid: tsi.is_some(),
                value: IndicatorValue::Simple(tsi.unwrap_or(0.0)),
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}
