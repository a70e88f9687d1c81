use common::Bar;

use super::{high_low, require, IndicatorResult};

/// Williams %R: −100 · (HH − close) / (HH − LL), −50 for a flat window.
#[derive(Debug, Clone)]
pub struct WilliamsRIndicator {
    pub period: usize,
}

impl Default for WilliamsRIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}

impl WilliamsRIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self { period }
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<f64> {
        require("williams_r", self.period, bars.len())?;

        let window = &bars[bars.len() - self.period..];
        let (hh, ll) = high_low(window);
        let range = hh - ll;
        if range <= 0.0 {
            return Ok(-50.0);
        }
        let close = window[window.len() - 1].close;
        Ok(-100.0 * (hh - close) / range)
    }
}
