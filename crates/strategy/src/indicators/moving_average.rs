use super::{require, IndicatorResult};

/// Exponential moving average, alpha = 2 / (period + 1).
///
/// Seeded with the first value and no bias adjustment, so it is defined
/// from index 0 onward.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    if let Some(&first) = iter.next() {
        out.push(first);
        let mut prev = first;
        for &v in iter {
            prev += k * (v - prev);
            out.push(prev);
        }
    }
    out
}

/// EMA at the last index.
pub fn latest_ema(values: &[f64], period: usize) -> IndicatorResult<f64> {
    require("ema", 1, values.len())?;
    Ok(*ema(values, period).last().unwrap_or(&f64::NAN))
}

/// Trailing arithmetic mean; NaN before index `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in period - 1..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().sum::<f64>() / period as f64;
    }
    out
}
