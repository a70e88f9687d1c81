use serde::Serialize;

use common::Bar;

use super::atr::AtrIndicator;
use super::moving_average::latest_ema;
use super::{require, IndicatorResult};

/// Keltner channels: EMA(period) ± multiplier · ATR(period).
#[derive(Debug, Clone)]
pub struct KeltnerIndicator {
    pub period: usize,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeltnerChannels {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Default for KeltnerIndicator {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl KeltnerIndicator {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Keltner period must be >= 1");
        Self { period, multiplier }
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<KeltnerChannels> {
        require("keltner", self.period, bars.len())?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = latest_ema(&closes, self.period)?;
        let atr = AtrIndicator::new(self.period).compute(bars)?;
        Ok(KeltnerChannels {
            upper: middle + self.multiplier * atr,
            middle,
            lower: middle - self.multiplier * atr,
        })
    }
}
