use common::Bar;

use super::{mean, require, IndicatorResult};

/// Commodity Channel Index over typical price.
///
/// CCI = (tp − SMA(tp)) / (0.015 · mean absolute deviation). The deviation
/// is the population mean of |tp − mean| over the window; a window with
/// zero deviation yields 0.
#[derive(Debug, Clone)]
pub struct CciIndicator {
    pub period: usize,
}

impl Default for CciIndicator {
    fn default() -> Self {
        Self::new(20)
    }
}

impl CciIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self { period }
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<f64> {
        require("cci", self.period, bars.len())?;

        let tp: Vec<f64> = bars[bars.len() - self.period..]
            .iter()
            .map(Bar::typical_price)
            .collect();
        let avg = mean(&tp);
        let mad = tp.iter().map(|v| (v - avg).abs()).sum::<f64>() / self.period as f64;
        if mad <= 0.0 {
            return Ok(0.0);
        }
        Ok((tp[tp.len() - 1] - avg) / (0.015 * mad))
    }
}
