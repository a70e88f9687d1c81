use common::{OrderSide, Signal, StrategyId};

use super::{SeriesBundle, Strategy, StrategyProfile};
use crate::indicators::{AtrIndicator, CciIndicator, StochasticIndicator, WilliamsRIndicator};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::Momentum,
    base_confidence: 58,
    sl_atr_multiplier: 0.7,
    sl_clamp: (5.0, 12.0),
    tp_multiplier: 1.5,
    tp_clamp: (8.0, 20.0),
    trailing: false,
};

/// Stochastic, CCI and Williams %R all at an extreme together.
#[derive(Debug, Clone, Default)]
pub struct Momentum {
    pub stochastic: StochasticIndicator,
    pub cci: CciIndicator,
    pub williams: WilliamsRIndicator,
    pub atr: AtrIndicator,
}

/// +8 for a deep %K, +7 each for deep CCI and %R.
fn depth_bonus(deep_k: bool, deep_cci: bool, deep_wr: bool) -> u32 {
    u32::from(deep_k) * 8 + u32::from(deep_cci) * 7 + u32::from(deep_wr) * 7
}

impl Strategy for Momentum {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let bars = bundle.m5.bars();
        let k = self.stochastic.compute(bars).ok()?.k;
        let cci = self.cci.compute(bars).ok()?;
        let wr = self.williams.compute(bars).ok()?;
        let atr = self.atr.compute(bars).ok()?;

        let (side, bonus) = if k < 20.0 && cci < -100.0 && wr < -80.0 {
            (OrderSide::Buy, depth_bonus(k < 10.0, cci < -150.0, wr < -90.0))
        } else if k > 80.0 && cci > 100.0 && wr > -20.0 {
            (OrderSide::Sell, depth_bonus(k > 90.0, cci > 150.0, wr > -10.0))
        } else {
            return None;
        };

        let reason = format!("Multi-momentum {}", side.to_string().to_lowercase());
        PROFILE.signal(&bundle.symbol, side, bonus, atr, reason)
    }
}
