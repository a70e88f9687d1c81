//! Full indicator snapshot for one symbol, with the verdict of every
//! registered strategy.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{OrderSide, StrategyId};

use crate::indicators::fibonacci::DEFAULT_LOOKBACK;
use crate::indicators::{
    latest_ema, Adx, AdxIndicator, AtrIndicator, BollingerBands, BollingerIndicator, CciIndicator,
    FibonacciRetracement, IndicatorResult, InsufficientData, Macd, MacdIndicator, PivotPoints,
    RsiIndicator, RsiZone, Stochastic, StochasticIndicator, SupportResistance,
    SupportResistanceLevels, WilliamsRIndicator,
};
use crate::registry::StrategyRegistry;
use crate::strategies::{SeriesBundle, Trend};

/// ADX above this is reported as a strong trend.
pub const STRONG_TREND_ADX: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrength {
    Strong,
    Weak,
}

/// Close relative to the Bollinger Bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandPosition {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub strategy: StrategyId,
    pub side: Option<OrderSide>,
    pub confidence: Option<u8>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,

    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: Trend,
    pub macd: Macd,
    pub adx: Adx,
    pub trend_strength: TrendStrength,

    pub rsi: f64,
    pub rsi_zone: RsiZone,
    pub stochastic: Stochastic,
    pub cci: f64,
    pub williams_r: f64,

    pub atr: f64,
    pub bollinger: BollingerBands,
    pub band_position: BandPosition,

    pub levels: SupportResistanceLevels,
    pub fibonacci: FibonacciRetracement,
    pub pivots: PivotPoints,

    /// `None` when H1 is too short for EMA(200).
    pub h1_trend: Option<Trend>,
    pub strategies: Vec<StrategyOutcome>,
}

pub fn analyze(bundle: &SeriesBundle, registry: &StrategyRegistry) -> IndicatorResult<SymbolAnalysis> {
    let bars = bundle.m5.bars();
    let closes = bundle.m5.closes();
    let last = bars.last().ok_or(InsufficientData {
        indicator: "analysis",
        required: 1,
        available: 0,
    })?;

    let ema_fast = latest_ema(&closes, 9)?;
    let ema_slow = latest_ema(&closes, 21)?;
    let adx = AdxIndicator::default().compute(bars)?;
    let rsi_indicator = RsiIndicator::default();
    let rsi = rsi_indicator.compute(&closes)?;
    let bollinger = BollingerIndicator::default().compute(&closes)?;

    let band_position = if last.close > bollinger.upper {
        BandPosition::Upper
    } else if last.close < bollinger.lower {
        BandPosition::Lower
    } else {
        BandPosition::Middle
    };

    let strategies = registry
        .outcomes(bundle)
        .into_iter()
        .map(|(strategy, signal)| StrategyOutcome {
            strategy,
            side: signal.as_ref().map(|s| s.side),
            confidence: signal.as_ref().map(|s| s.confidence),
            reason: signal.map(|s| s.reason),
        })
        .collect();

    Ok(SymbolAnalysis {
        symbol: bundle.symbol.clone(),
        price: last.close,
        timestamp: last.timestamp,
        ema_fast,
        ema_slow,
        ema_trend: if ema_fast > ema_slow { Trend::Bullish } else { Trend::Bearish },
        macd: MacdIndicator::default().compute(&closes)?,
        trend_strength: if adx.adx > STRONG_TREND_ADX {
            TrendStrength::Strong
        } else {
            TrendStrength::Weak
        },
        adx,
        rsi,
        rsi_zone: rsi_indicator.zone(rsi),
        stochastic: StochasticIndicator::default().compute(bars)?,
        cci: CciIndicator::default().compute(bars)?,
        williams_r: WilliamsRIndicator::default().compute(bars)?,
        atr: AtrIndicator::default().compute(bars)?,
        bollinger,
        band_position,
        levels: SupportResistance::default().compute(bars)?,
        fibonacci: FibonacciRetracement::compute(bars, DEFAULT_LOOKBACK)?,
        pivots: PivotPoints::from_bars(bars)?,
        h1_trend: Trend::of(&bundle.h1),
        strategies,
    })
}
