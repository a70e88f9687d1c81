use common::{OrderSide, Signal, StrategyId};

use super::{average_volume, SeriesBundle, Strategy, StrategyProfile};
use crate::indicators::{AtrIndicator, ParabolicSar, PivotPoints};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::Breakout,
    base_confidence: 62,
    sl_atr_multiplier: 1.0,
    sl_clamp: (10.0, 25.0),
    tp_multiplier: 2.0,
    tp_clamp: (20.0, 50.0),
    trailing: false,
};

/// Close through R1/S1 on a volume spike, on the right side of the SAR.
#[derive(Debug, Clone)]
pub struct Breakout {
    pub sar: ParabolicSar,
    pub atr: AtrIndicator,
    pub volume_period: usize,
    pub volume_spike: f64,
    pub strong_volume: f64,
}

impl Default for Breakout {
    fn default() -> Self {
        Self {
            sar: ParabolicSar::default(),
            atr: AtrIndicator::default(),
            volume_period: 20,
            volume_spike: 1.5,
            strong_volume: 2.0,
        }
    }
}

impl Strategy for Breakout {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let bars = bundle.m5.bars();
        let pivots = PivotPoints::from_bars(bars).ok()?;
        let sar = self.sar.compute(bars).ok()?;
        let atr = self.atr.compute(bars).ok()?;
        let avg_volume = average_volume(bars, self.volume_period)?;

        let n = bars.len();
        let (prev, curr) = (bars[n - 2].close, &bars[n - 1]);
        let price = curr.close;
        if curr.volume <= avg_volume * self.volume_spike {
            return None;
        }

        let (side, beyond_second) = if prev <= pivots.r1 && price > pivots.r1 && price > sar {
            (OrderSide::Buy, price > pivots.r2)
        } else if prev >= pivots.s1 && price < pivots.s1 && price < sar {
            (OrderSide::Sell, price < pivots.s2)
        } else {
            return None;
        };

        let mut bonus = 0;
        if curr.volume > avg_volume * self.strong_volume {
            bonus += 10;
        }
        if beyond_second {
            bonus += 5;
        }

        PROFILE.signal(
            &bundle.symbol,
            side,
            bonus,
            atr,
            "Pivot breakout + volume spike".to_string(),
        )
    }
}
