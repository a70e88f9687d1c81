use common::{OrderSide, Signal, StrategyId};

use super::{SeriesBundle, Strategy, StrategyProfile};
use crate::indicators::{AtrIndicator, BollingerIndicator, RsiIndicator, StochasticIndicator};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::MeanReversion,
    base_confidence: 60,
    sl_atr_multiplier: 0.8,
    sl_clamp: (6.0, 15.0),
    tp_multiplier: 1.5,
    tp_clamp: (10.0, 25.0),
    trailing: false,
};

/// Fade a Bollinger Band touch when RSI and Stochastic are both stretched.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    pub bollinger: BollingerIndicator,
    pub rsi: RsiIndicator,
    pub stochastic: StochasticIndicator,
    pub atr: AtrIndicator,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self {
            bollinger: BollingerIndicator::default(),
            rsi: RsiIndicator::new(14, 65.0, 35.0),
            stochastic: StochasticIndicator::default(),
            atr: AtrIndicator::default(),
        }
    }
}

impl Strategy for MeanReversion {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let bars = bundle.m5.bars();
        let closes = bundle.m5.closes();

        let bands = self.bollinger.compute(&closes).ok()?;
        let rsi = self.rsi.compute(&closes).ok()?;
        let k = self.stochastic.compute(bars).ok()?.k;
        let atr = self.atr.compute(bars).ok()?;
        let price = *closes.last()?;

        let (side, bonus) = if price <= bands.lower && rsi < self.rsi.oversold && k < 25.0 {
            let mut bonus = 0;
            if rsi < 25.0 {
                bonus += 10;
            }
            if k < 15.0 {
                bonus += 8;
            }
            (OrderSide::Buy, bonus)
        } else if price >= bands.upper && rsi > self.rsi.overbought && k > 75.0 {
            let mut bonus = 0;
            if rsi > 75.0 {
                bonus += 10;
            }
            if k > 85.0 {
                bonus += 8;
            }
            (OrderSide::Sell, bonus)
        } else {
            return None;
        };

        let reason = format!("BB + RSI + Stochastic {}", side.to_string().to_lowercase());
        PROFILE.signal(&bundle.symbol, side, bonus, atr, reason)
    }
}
