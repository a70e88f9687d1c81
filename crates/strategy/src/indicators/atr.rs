use common::Bar;

use super::moving_average::sma;
use super::{require, IndicatorResult};

/// True Range per bar: max(high−low, |high−prevClose|, |low−prevClose|).
/// The first bar has no previous close and degenerates to high − low.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    if let Some(first) = bars.first() {
        tr.push(first.high - first.low);
    }
    tr.extend(bars.windows(2).map(|w| {
        let (prev, bar) = (&w[0], &w[1]);
        (bar.high - bar.low)
            .max((bar.high - prev.close).abs())
            .max((bar.low - prev.close).abs())
    }));
    tr
}

/// Average True Range: trailing simple mean of the True Range.
#[derive(Debug, Clone)]
pub struct AtrIndicator {
    pub period: usize,
}

impl Default for AtrIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }

    /// Full ATR series, NaN before index `period - 1`.
    pub fn series(&self, bars: &[Bar]) -> Vec<f64> {
        sma(&true_range(bars), self.period)
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<f64> {
        require("atr", self.period, bars.len())?;
        let window = &true_range(bars)[bars.len() - self.period..];
        Ok(window.iter().sum::<f64>() / self.period as f64)
    }
}
