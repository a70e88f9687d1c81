use common::{OrderSide, Signal, StrategyId, Timeframe};

use super::{long_emas, SeriesBundle, Strategy, StrategyProfile};
use crate::indicators::{latest_ema, AtrIndicator, RsiIndicator};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::MultiTimeframeConfluence,
    base_confidence: 80,
    sl_atr_multiplier: 1.5,
    sl_clamp: (12.0, 30.0),
    tp_multiplier: 2.5,
    tp_clamp: (30.0, 75.0),
    trailing: true,
};

/// All four timeframes pointing the same way.
///
/// Needs the M15 and H4 series in the bundle; without them it never fires.
#[derive(Debug, Clone, Default)]
pub struct MultiTimeframeConfluence {
    pub rsi: RsiIndicator,
    pub atr: AtrIndicator,
}

/// Sign of `a − b`: `Some(Buy)` above, `Some(Sell)` below, `None` when equal.
fn direction(a: f64, b: f64) -> Option<OrderSide> {
    if a > b {
        Some(OrderSide::Buy)
    } else if a < b {
        Some(OrderSide::Sell)
    } else {
        None
    }
}

fn short_direction(closes: &[f64]) -> Option<OrderSide> {
    direction(latest_ema(closes, 9).ok()?, latest_ema(closes, 21).ok()?)
}

impl Strategy for MultiTimeframeConfluence {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn timeframes(&self) -> &'static [Timeframe] {
        &[Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::H4]
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let (m15, h4) = (bundle.m15.as_ref()?, bundle.h4.as_ref()?);
        let closes = bundle.m5.closes();
        let rsi = self.rsi.compute(&closes).ok()?;
        let atr = self.atr.compute(bundle.m5.bars()).ok()?;

        let side = short_direction(&closes)?;
        let rsi_agrees = match side {
            OrderSide::Buy => rsi > 50.0,
            OrderSide::Sell => rsi < 50.0,
        };
        if !rsi_agrees {
            return None;
        }
        let (h1_fast, h1_slow) = long_emas(&bundle.h1)?;
        let (h4_fast, h4_slow) = long_emas(h4)?;
        let aligned = short_direction(&m15.closes()) == Some(side)
            && direction(h1_fast, h1_slow) == Some(side)
            && direction(h4_fast, h4_slow) == Some(side);
        if !aligned {
            return None;
        }

        let strong_rsi = match side {
            OrderSide::Buy => rsi > 55.0,
            OrderSide::Sell => rsi < 45.0,
        };
        PROFILE.signal(
            &bundle.symbol,
            side,
            if strong_rsi { 5 } else { 0 },
            atr,
            "All timeframes aligned".to_string(),
        )
    }
}
