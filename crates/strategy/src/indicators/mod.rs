//! Technical indicators over a whole bar series.
//!
//! Every indicator is recomputed from the full slice it is given and the
//! caller reads the value at the last bar. Inputs shorter than the warm-up
//! window yield [`InsufficientData`] instead of a NaN-poisoned value.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod fibonacci;
pub mod keltner;
pub mod levels;
pub mod macd;
pub mod moving_average;
pub mod parabolic_sar;
pub mod pivots;
pub mod rsi;
pub mod stochastic;
pub mod williams;

pub use adx::{Adx, AdxIndicator};
pub use atr::{true_range, AtrIndicator};
pub use bollinger::{BollingerBands, BollingerIndicator};
pub use cci::CciIndicator;
pub use fibonacci::{FibonacciExtension, FibonacciRetracement};
pub use keltner::{KeltnerChannels, KeltnerIndicator};
pub use levels::{cluster_levels, SupportResistance, SupportResistanceLevels};
pub use macd::{Macd, MacdIndicator};
pub use moving_average::{ema, latest_ema, sma};
pub use parabolic_sar::ParabolicSar;
pub use pivots::PivotPoints;
pub use rsi::{RsiIndicator, RsiZone};
pub use stochastic::{Stochastic, StochasticIndicator};
pub use williams::WilliamsRIndicator;

use thiserror::Error;

/// The series is shorter than the indicator's warm-up window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{indicator} needs at least {required} bars, got {available}")]
pub struct InsufficientData {
    pub indicator: &'static str,
    pub required: usize,
    pub available: usize,
}

pub type IndicatorResult<T> = Result<T, InsufficientData>;

pub(crate) fn require(indicator: &'static str, required: usize, available: usize) -> IndicatorResult<()> {
    if available < required {
        Err(InsufficientData {
            indicator,
            required,
            available,
        })
    } else {
        Ok(())
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Highest high and lowest low over a bar window.
pub(crate) fn high_low(bars: &[common::Bar]) -> (f64, f64) {
    bars.iter().fold((f64::MIN, f64::MAX), |(hh, ll), b| {
        (hh.max(b.high), ll.min(b.low))
    })
}

/// Synthetic zero-range bars from closes, one per five minutes.
#[cfg(test)]
pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<common::Bar> {
    use chrono::{TimeZone, Utc};
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| common::Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
        })
        .collect()
}

/// Synthetic bars with a symmetric `half_range` around each close.
#[cfg(test)]
pub(crate) fn bars_with_range(closes: &[f64], half_range: f64) -> Vec<common::Bar> {
    bars_from_closes(closes)
        .into_iter()
        .map(|mut b| {
            b.high = b.close + half_range;
            b.low = b.close - half_range;
            b
        })
        .collect()
}
