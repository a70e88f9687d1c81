use serde::Serialize;

use common::Bar;

use super::{require, IndicatorResult};

/// Classic floor pivots from the previous bar's high, low and close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        Self {
            pivot,
            r1: 2.0 * pivot - low,
            r2: pivot + (high - low),
            r3: high + 2.0 * (pivot - low),
            s1: 2.0 * pivot - high,
            s2: pivot - (high - low),
            s3: low - 2.0 * (high - pivot),
        }
    }

    /// Pivots for the last bar, computed from the one before it.
    pub fn from_bars(bars: &[Bar]) -> IndicatorResult<Self> {
        require("pivot_points", 2, bars.len())?;
        let prev = &bars[bars.len() - 2];
        Ok(Self::from_hlc(prev.high, prev.low, prev.close))
    }
}
