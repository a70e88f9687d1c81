use serde::Serialize;

use common::Bar;

use super::atr::true_range;
use super::{mean, require, IndicatorResult};

/// Average Directional Index.
///
/// +DM = max(high − prevHigh, 0) and −DM = max(prevLow − low, 0), both kept
/// even when the other side is larger. +DI/−DI are their trailing means over
/// the trailing mean True Range; ADX is the trailing mean of DX.
#[derive(Debug, Clone)]
pub struct AdxIndicator {
    pub period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adx {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

impl Default for AdxIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}

impl AdxIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self { period }
    }

    /// Needs `2 * period` bars: `period` for the first DI, then `period` DX values.
    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<Adx> {
        let p = self.period;
        require("adx", 2 * p, bars.len())?;

        // Index 0 has no previous bar; the DM windows below start at index 1.
        let mut plus_dm = vec![0.0; bars.len()];
        let mut minus_dm = vec![0.0; bars.len()];
        for i in 1..bars.len() {
            plus_dm[i] = (bars[i].high - bars[i - 1].high).max(0.0);
            minus_dm[i] = (bars[i - 1].low - bars[i].low).max(0.0);
        }
        let tr = true_range(bars);

        let directional = |i: usize| -> (f64, f64) {
            let range = i + 1 - p..=i;
            let atr = mean(&tr[range.clone()]);
            if atr <= 0.0 {
                return (0.0, 0.0);
            }
            (
                100.0 * mean(&plus_dm[range.clone()]) / atr,
                100.0 * mean(&minus_dm[range]) / atr,
            )
        };

        let dx: Vec<f64> = (p..bars.len())
            .map(|i| {
                let (plus, minus) = directional(i);
                dx(plus, minus)
            })
            .collect();

        let (plus_di, minus_di) = directional(bars.len() - 1);
        Ok(Adx {
            adx: mean(&dx[dx.len() - p..]),
            plus_di,
            minus_di,
        })
    }
}

/// DX = 100 · |+DI − −DI| / (+DI + −DI), defined as 0 when both are 0.
pub fn dx(plus_di: f64, minus_di: f64) -> f64 {
    let sum = plus_di + minus_di;
    if sum <= 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / sum
    }
}
