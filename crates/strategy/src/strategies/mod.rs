//! The six strategy evaluators.
//!
//! Each evaluator reads a [`SeriesBundle`] and either returns a [`Signal`]
//! or `None`. Short or degenerate input is always `None`.

pub mod breakout;
pub mod confluence;
pub mod fibonacci;
pub mod mean_reversion;
pub mod momentum;
pub mod trend_following;

pub use breakout::Breakout;
pub use confluence::MultiTimeframeConfluence;
pub use fibonacci::FibonacciRetracementStrategy;
pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use trend_following::TrendFollowing;

use std::fmt;

use serde::Serialize;

use common::{Bar, OrderSide, Series, Signal, StrategyId, Timeframe};

use crate::indicators::latest_ema;

/// Series one symbol is evaluated on. M15 and H4 are only fetched when a
/// registered strategy asks for them.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    pub symbol: String,
    pub m5: Series,
    pub h1: Series,
    pub m15: Option<Series>,
    pub h4: Option<Series>,
}

impl SeriesBundle {
    pub fn new(m5: Series, h1: Series) -> Self {
        Self {
            symbol: m5.symbol().to_string(),
            m5,
            h1,
            m15: None,
            h4: None,
        }
    }

    pub fn with_higher_timeframes(mut self, m15: Series, h4: Series) -> Self {
        self.m15 = Some(m15);
        self.h4 = Some(h4);
        self
    }

    /// Price of the last M5 bar.
    pub fn reference_price(&self) -> Option<f64> {
        self.m5.last().map(|b| b.close)
    }
}

/// All strategy implementations must satisfy this trait.
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str {
        self.id().as_str()
    }

    /// Timeframes this strategy reads from the bundle.
    fn timeframes(&self) -> &'static [Timeframe] {
        &[Timeframe::M5, Timeframe::H1]
    }

    /// Evaluate the bundle and optionally emit a signal.
    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal>;
}

/// Static metadata shared by every signal a strategy emits: base score and
/// the ATR-derived stop and target rules.
#[derive(Debug, Clone, Copy)]
pub struct StrategyProfile {
    pub id: StrategyId,
    pub base_confidence: u8,
    pub sl_atr_multiplier: f64,
    pub sl_clamp: (f64, f64),
    /// Take-profit as a multiple of the unclamped stop.
    pub tp_multiplier: f64,
    pub tp_clamp: (f64, f64),
    pub trailing: bool,
}

impl StrategyProfile {
    /// Stop-loss and take-profit in pips, each clamped to its range.
    pub fn stops(&self, atr: f64, pip_size: f64) -> Option<(f64, f64)> {
        let sl_raw = atr / pip_size * self.sl_atr_multiplier;
        if !sl_raw.is_finite() {
            return None;
        }
        let tp_raw = sl_raw * self.tp_multiplier;
        Some((
            sl_raw.clamp(self.sl_clamp.0, self.sl_clamp.1),
            tp_raw.clamp(self.tp_clamp.0, self.tp_clamp.1),
        ))
    }

    /// Base plus bonuses, capped at 100.
    pub fn confidence(&self, bonus: u32) -> u8 {
        (u32::from(self.base_confidence) + bonus).min(100) as u8
    }

    pub fn signal(
        &self,
        symbol: &str,
        side: OrderSide,
        bonus: u32,
        atr: f64,
        reason: String,
    ) -> Option<Signal> {
        let (sl, tp) = self.stops(atr, common::pip_size(symbol))?;
        Some(Signal {
            symbol: symbol.to_string(),
            side,
            confidence: self.confidence(bonus),
            stop_loss_pips: sl,
            take_profit_pips: tp,
            strategy: self.id,
            reason,
            trailing_stop_pips: self.trailing.then_some(sl),
        })
    }
}

/// Higher-timeframe trend from EMA(50) against EMA(200). Equal averages
/// count as bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn of(series: &Series) -> Option<Self> {
        let (fast, slow) = long_emas(series)?;
        Some(if fast > slow { Trend::Bullish } else { Trend::Bearish })
    }

    pub fn side(self) -> OrderSide {
        match self {
            Trend::Bullish => OrderSide::Buy,
            Trend::Bearish => OrderSide::Sell,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
        }
    }
}

/// EMA(50) and EMA(200) at the last close.
pub(crate) fn long_emas(series: &Series) -> Option<(f64, f64)> {
    let closes = series.closes();
    Some((latest_ema(&closes, 50).ok()?, latest_ema(&closes, 200).ok()?))
}

/// Mean volume of the trailing `period` bars, current bar included.
pub(crate) fn average_volume(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let window = &bars[bars.len() - period..];
    Some(window.iter().map(|b| b.volume).sum::<f64>() / period as f64)
}
