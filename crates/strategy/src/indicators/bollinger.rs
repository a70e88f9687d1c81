use serde::Serialize;

use super::{mean, require, IndicatorResult};

/// Bollinger Bands: SMA ± k · sample standard deviation (n − 1).
#[derive(Debug, Clone)]
pub struct BollingerIndicator {
    pub period: usize,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Default for BollingerIndicator {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl BollingerIndicator {
    pub fn new(period: usize, std_dev: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        Self { period, std_dev }
    }

    pub fn compute(&self, closes: &[f64]) -> IndicatorResult<BollingerBands> {
        require("bollinger", self.period, closes.len())?;

        let window = &closes[closes.len() - self.period..];
        let middle = mean(window);
        let variance = window.iter().map(|v| (v - middle).powi(2)).sum::<f64>()
            / (self.period - 1) as f64;
        let width = self.std_dev * variance.sqrt();

        Ok(BollingerBands {
            upper: middle + width,
            middle,
            lower: middle - width,
        })
    }
}
