use serde::Serialize;

use super::moving_average::ema;
use super::{require, IndicatorResult};

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// MACD line = EMA(fast) − EMA(slow), signal = EMA(macd_line, signal_period),
/// histogram = line − signal.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// MACD values at the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD fast period must be less than slow period");
        Self { fast, slow, signal }
    }

    /// Needs at least `slow + signal` closes.
    pub fn compute(&self, closes: &[f64]) -> IndicatorResult<Macd> {
        require("macd", self.slow + self.signal, closes.len())?;

        let fast = ema(closes, self.fast);
        let slow = ema(closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = ema(&line, self.signal);

        let line = line[line.len() - 1];
        let signal = signal_line[signal_line.len() - 1];
        Ok(Macd {
            line,
            signal,
            histogram: line - signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_up(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 0.5).collect()
    }

    #[test]
    fn macd_errors_with_insufficient_data() {
        let macd = MacdIndicator::default();
        let prices = vec![100.0; 30]; // need >= 35
        assert!(macd.compute(&prices).is_err());
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let macd = MacdIndicator::default();
        let value = macd.compute(&[1.1; 60]).unwrap();
        assert_eq!(value.line, 0.0);
        assert_eq!(value.histogram, 0.0);
    }

    #[test]
    fn macd_positive_on_steady_uptrend() {
        let macd = MacdIndicator::default();
        let value = macd.compute(&trending_up(80)).unwrap();
        assert!(value.line > 0.0);
        assert!((value.histogram - (value.line - value.signal)).abs() < 1e-12);
    }

    #[test]
    fn macd_line_below_signal_after_sudden_drop() {
        let macd = MacdIndicator::default();
        let mut prices = vec![1.1; 60];
        prices.push(1.09);
        let value = macd.compute(&prices).unwrap();
        assert!(value.line < 0.0);
        assert!(value.line < value.signal);
    }
}
