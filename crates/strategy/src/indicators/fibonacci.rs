use serde::Serialize;

use common::Bar;

use super::{high_low, require, IndicatorResult};

/// Retracement levels between the swing high and swing low of the trailing
/// `lookback` bars. `fib_0` is the high and `fib_100` the low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciRetracement {
    pub swing_high: f64,
    pub swing_low: f64,
    pub fib_0: f64,
    pub fib_236: f64,
    pub fib_382: f64,
    pub fib_500: f64,
    pub fib_618: f64,
    pub fib_786: f64,
    pub fib_100: f64,
}

/// Extension levels projected up from the swing low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciExtension {
    pub ext_0: f64,
    pub ext_618: f64,
    pub ext_1000: f64,
    pub ext_1272: f64,
    pub ext_1618: f64,
    pub ext_2000: f64,
}

pub const DEFAULT_LOOKBACK: usize = 50;

impl FibonacciRetracement {
    pub fn from_swing(swing_high: f64, swing_low: f64) -> Self {
        let diff = swing_high - swing_low;
        Self {
            swing_high,
            swing_low,
            fib_0: swing_high,
            fib_236: swing_high - diff * 0.236,
            fib_382: swing_high - diff * 0.382,
            fib_500: swing_high - diff * 0.5,
            fib_618: swing_high - diff * 0.618,
            fib_786: swing_high - diff * 0.786,
            fib_100: swing_low,
        }
    }

    pub fn compute(bars: &[Bar], lookback: usize) -> IndicatorResult<Self> {
        require("fibonacci", lookback.max(1), bars.len())?;
        let (hh, ll) = high_low(&bars[bars.len() - lookback.max(1)..]);
        Ok(Self::from_swing(hh, ll))
    }

    /// Levels from 0% to 100%, highest first.
    pub fn levels(&self) -> [f64; 7] {
        [
            self.fib_0,
            self.fib_236,
            self.fib_382,
            self.fib_500,
            self.fib_618,
            self.fib_786,
            self.fib_100,
        ]
    }
}

impl FibonacciExtension {
    pub fn from_swing(swing_high: f64, swing_low: f64) -> Self {
        let diff = swing_high - swing_low;
        Self {
            ext_0: swing_low,
            ext_618: swing_low + diff * 0.618,
            ext_1000: swing_low + diff,
            ext_1272: swing_low + diff * 1.272,
            ext_1618: swing_low + diff * 1.618,
            ext_2000: swing_low + diff * 2.0,
        }
    }

    pub fn compute(bars: &[Bar], lookback: usize) -> IndicatorResult<Self> {
        let r = FibonacciRetracement::compute(bars, lookback)?;
        Ok(Self::from_swing(r.swing_high, r.swing_low))
    }
}
