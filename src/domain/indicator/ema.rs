//! Moving-average building blocks shared by the oscillators.
//!
//! Inputs are `Option<f64>` so that one indicator's warmup (`None`) can feed
//! the next smoothing stage.
//!
//! EMA: k = 2/(n+1), seed with the SMA of the first n defined inputs, then
//! EMA[i] = x[i]*k + EMA[i-1]*(1-k).

pub fn ema(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if period == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut ema = 0.0;

    for value in values {
        let Some(x) = *value else {
            out.push(None);
            continue;
        };

        seen += 1;
        if seen < period {
            sum += x;
            out.push(None);
        } else if seen == period {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}

/// Rolling mean over the last `period` inputs; `None` unless all are defined.
pub fn sma(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum: Option<f64> = window.iter().copied().sum();
            sum.map(|s| s / period as f64)
        })
        .collect()
}
