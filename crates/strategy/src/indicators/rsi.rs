use serde::{Deserialize, Serialize};

use super::{require, IndicatorResult};

/// RSI (Relative Strength Index) indicator.
///
/// Average gain and average loss are plain trailing means of the last
/// `period` close-to-close deltas (not Wilder smoothing).
/// Needs at least `period + 1` closes.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

/// Where an RSI reading sits relative to the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(14, 70.0, 30.0)
    }
}

impl RsiIndicator {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period, overbought, oversold }
    }

    /// RSI at the last close.
    ///
    /// With no losses in the window the ratio is undefined: the result is
    /// 100 when there were gains and 50 for a perfectly flat window.
    pub fn compute(&self, closes: &[f64]) -> IndicatorResult<f64> {
        require("rsi", self.period + 1, closes.len())?;

        let window = &closes[closes.len() - self.period - 1..];
        let (gain, loss) = window.windows(2).fold((0.0, 0.0), |(g, l), w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });
        let avg_gain = gain / self.period as f64;
        let avg_loss = loss / self.period as f64;

        if avg_loss <= f64::EPSILON {
            return Ok(if avg_gain <= f64::EPSILON { 50.0 } else { 100.0 });
        }

        let rs = avg_gain / avg_loss;
        Ok(100.0 - 100.0 / (1.0 + rs))
    }

    pub fn zone(&self, rsi: f64) -> RsiZone {
        if rsi > self.overbought {
            RsiZone::Overbought
        } else if rsi < self.oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}
