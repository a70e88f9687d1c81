use serde::Serialize;

use common::Bar;

use super::{high_low, mean, require, IndicatorResult};

/// Stochastic oscillator (%K over `k_period` bars, %D = mean of the last
/// `d_period` %K values).
#[derive(Debug, Clone)]
pub struct StochasticIndicator {
    pub k_period: usize,
    pub d_period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
}

impl Default for StochasticIndicator {
    fn default() -> Self {
        Self::new(14, 3)
    }
}

impl StochasticIndicator {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        assert!(k_period >= 1 && d_period >= 1, "Stochastic periods must be >= 1");
        Self { k_period, d_period }
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorResult<Stochastic> {
        require("stochastic", self.k_period + self.d_period - 1, bars.len())?;

        let n = bars.len();
        let ks: Vec<f64> = (n - self.d_period..n)
            .map(|i| percent_k(&bars[i + 1 - self.k_period..=i]))
            .collect();

        Ok(Stochastic {
            k: ks[ks.len() - 1],
            d: mean(&ks),
        })
    }
}

/// %K for the last bar of `window`; 50 when the window has no range.
fn percent_k(window: &[Bar]) -> f64 {
    let (hh, ll) = high_low(window);
    let close = window[window.len() - 1].close;
    let range = hh - ll;
    if range <= 0.0 {
        50.0
    } else {
        100.0 * (close - ll) / range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{bars_from_closes, bars_with_range};

    #[test]
    fn flat_range_is_fifty() {
        let bars = bars_from_closes(&[1.1; 20]);
        let stoch = StochasticIndicator::default().compute(&bars).unwrap();
        assert_eq!(stoch.k, 50.0);
        assert_eq!(stoch.d, 50.0);
    }

    #[test]
    fn close_at_high_is_hundred() {
        let closes: Vec<f64> = (0..20).map(|i| 1.0 + i as f64 * 0.01).collect();
        let bars = bars_from_closes(&closes);
        let stoch = StochasticIndicator::default().compute(&bars).unwrap();
        assert!((stoch.k - 100.0).abs() < 1e-9);
    }

    #[test]
    fn close_at_low_is_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 2.0 - i as f64 * 0.01).collect();
        let bars = bars_with_range(&closes, 0.0);
        let stoch = StochasticIndicator::default().compute(&bars).unwrap();
        assert!(stoch.k.abs() < 1e-9);
    }

    #[test]
    fn needs_k_plus_d_minus_one_bars() {
        let bars = bars_from_closes(&[1.0; 15]);
        assert!(StochasticIndicator::default().compute(&bars).is_err());
        let bars = bars_from_closes(&[1.0; 16]);
        assert!(StochasticIndicator::default().compute(&bars).is_ok());
    }
}
