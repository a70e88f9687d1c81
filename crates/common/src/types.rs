use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV observation. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Tick or real volume; only ever compared against its own average.
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Positive finite prices inside the high/low envelope, non-negative volume.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        self.high >= self.open.max(self.close)
            && self.open.min(self.close) >= self.low
            && self.volume.is_finite()
            && self.volume >= 0.0
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Bar aggregation period of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    M5,
    M15,
    H1,
    H4,
}

impl Timeframe {
    /// Number of bars requested from the data source per scan.
    pub fn fetch_count(self) -> usize {
        match self {
            Timeframe::M5 => 200,
            Timeframe::M15 => 100,
            Timeframe::H1 => 100,
            Timeframe::H4 => 50,
        }
    }

    /// Shortest series the scanner will hand to the strategies.
    pub fn min_bars(self) -> usize {
        match self {
            Timeframe::M5 => 100,
            Timeframe::H1 => 50,
            Timeframe::M15 | Timeframe::H4 => 1,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::M5 => write!(f, "M5"),
            Timeframe::M15 => write!(f, "M15"),
            Timeframe::H1 => write!(f, "H1"),
            Timeframe::H4 => write!(f, "H4"),
        }
    }
}

/// Time-ascending bars for one symbol on one timeframe.
///
/// Timestamps are strictly increasing; gaps are allowed and never filled.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<Bar>) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(idx) = bars.iter().position(|b| !b.is_sane()) {
            return Err(Error::InvalidSeries(format!(
                "{symbol} {timeframe}: bar {idx} violates OHLC sanity"
            )));
        }
        if let Some(idx) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(Error::InvalidSeries(format!(
                "{symbol} {timeframe}: timestamp at bar {} is not after bar {idx}",
                idx + 1
            )));
        }
        Ok(Self { symbol, timeframe, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Identifier of the strategy that produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyId {
    TrendFollowing,
    FibonacciRetracement,
    MeanReversion,
    Breakout,
    Momentum,
    MultiTimeframeConfluence,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::TrendFollowing,
        StrategyId::FibonacciRetracement,
        StrategyId::MeanReversion,
        StrategyId::Breakout,
        StrategyId::Momentum,
        StrategyId::MultiTimeframeConfluence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::TrendFollowing => "TREND_FOLLOWING",
            StrategyId::FibonacciRetracement => "FIBONACCI_RETRACEMENT",
            StrategyId::MeanReversion => "MEAN_REVERSION",
            StrategyId::Breakout => "BREAKOUT",
            StrategyId::Momentum => "MOMENTUM",
            StrategyId::MultiTimeframeConfluence => "MULTI_TIMEFRAME_CONFLUENCE",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade idea emitted by a strategy evaluator.
///
/// Absence of a setup is `None` at the call site, never a zero-confidence signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub side: OrderSide,
    /// 0..=100, base score plus bonuses.
    pub confidence: u8,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    pub strategy: StrategyId,
    pub reason: String,
    pub trailing_stop_pips: Option<f64>,
}

/// Fields the ranker attaches to an opportunity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub estimated_win_rate: f64,
    pub lot_size: f64,
    pub expected_value: f64,
}

/// A signal tagged with the reference price at scan time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(flatten)]
    pub signal: Signal,
    pub reference_price: f64,
    /// `None` until the ranker has run.
    #[serde(default)]
    pub ranking: Option<Ranking>,
}

impl Opportunity {
    pub fn new(signal: Signal, reference_price: f64) -> Self {
        Self {
            signal,
            reference_price,
            ranking: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.signal.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.signal.side
    }

    pub fn confidence(&self) -> u8 {
        self.signal.confidence
    }

    pub fn expected_value(&self) -> Option<f64> {
        self.ranking.map(|r| r.expected_value)
    }
}

/// An already-open position as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: String,
    pub side: OrderSide,
}

/// Read-only account snapshot supplied per ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
    pub equity: f64,
    /// Used margin; zero when nothing is open.
    pub margin: f64,
    /// Equity / margin in percent.
    pub margin_level: f64,
    #[serde(default)]
    pub open_positions: Vec<OpenPosition>,
}

/// Reference balances for the loss-limit gates, owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionBalances {
    pub day_start: f64,
    #[serde(default)]
    pub hour_start: Option<f64>,
}

/// Reason a candidate was refused by the admission gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectionReason {
    DailyLossLimit { pnl_pct: f64 },
    HourlyLossLimit { pnl_pct: f64 },
    InsufficientMargin { margin_level: f64 },
    MaxConcurrentTrades { max: usize },
    CorrelationConflict {
        existing_symbol: String,
        existing_side: OrderSide,
    },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::DailyLossLimit { pnl_pct } => {
                write!(f, "daily loss limit reached ({:.2}%)", pnl_pct * 100.0)
            }
            RejectionReason::HourlyLossLimit { pnl_pct } => {
                write!(f, "hourly loss limit reached ({:.2}%)", pnl_pct * 100.0)
            }
            RejectionReason::InsufficientMargin { margin_level } => {
                write!(f, "insufficient margin ({margin_level:.2}%)")
            }
            RejectionReason::MaxConcurrentTrades { max } => {
                write!(f, "max concurrent trades ({max}) reached")
            }
            RejectionReason::CorrelationConflict {
                existing_symbol,
                existing_side,
            } => write!(
                f,
                "correlation conflict with open {existing_side} on {existing_symbol}"
            ),
        }
    }
}
