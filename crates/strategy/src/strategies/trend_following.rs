use common::{OrderSide, Signal, StrategyId};

use super::{average_volume, SeriesBundle, Strategy, StrategyProfile, Trend};
use crate::indicators::{ema, AtrIndicator, MacdIndicator};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::TrendFollowing,
    base_confidence: 65,
    sl_atr_multiplier: 1.2,
    sl_clamp: (8.0, 25.0),
    tp_multiplier: 1.8,
    tp_clamp: (15.0, 45.0),
    trailing: true,
};

/// EMA crossover on M5 confirmed by MACD and the H1 trend.
#[derive(Debug, Clone)]
pub struct TrendFollowing {
    pub fast_period: usize,
    pub slow_period: usize,
    pub macd: MacdIndicator,
    pub atr: AtrIndicator,
    pub volume_period: usize,
    pub volume_spike: f64,
    pub min_separation: f64,
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 21,
            macd: MacdIndicator::default(),
            atr: AtrIndicator::default(),
            volume_period: 20,
            volume_spike: 1.15,
            min_separation: 0.0005,
        }
    }
}

impl Strategy for TrendFollowing {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let bars = bundle.m5.bars();
        let closes = bundle.m5.closes();
        if closes.len() < 2 {
            return None;
        }

        let fast = ema(&closes, self.fast_period);
        let slow = ema(&closes, self.slow_period);
        let n = closes.len();
        let (prev_fast, prev_slow) = (fast[n - 2], slow[n - 2]);
        let (curr_fast, curr_slow) = (fast[n - 1], slow[n - 1]);

        let macd = self.macd.compute(&closes).ok()?;
        let atr = self.atr.compute(bars).ok()?;
        let avg_volume = average_volume(bars, self.volume_period)?;
        let trend = Trend::of(&bundle.h1)?;

        let side = if prev_fast <= prev_slow
            && curr_fast > curr_slow
            && macd.line > macd.signal
            && trend == Trend::Bullish
        {
            OrderSide::Buy
        } else if prev_fast >= prev_slow
            && curr_fast < curr_slow
            && macd.line < macd.signal
            && trend == Trend::Bearish
        {
            OrderSide::Sell
        } else {
            return None;
        };

        let mut bonus = 0;
        if bars[n - 1].volume > avg_volume * self.volume_spike {
            bonus += 10;
        }
        let (macd_agrees, separation) = match side {
            OrderSide::Buy => (macd.line > 0.0, (curr_fast - curr_slow) / curr_slow),
            OrderSide::Sell => (macd.line < 0.0, (curr_slow - curr_fast) / curr_slow),
        };
        if macd_agrees {
            bonus += 5;
        }
        if separation > self.min_separation {
            bonus += 5;
        }

        PROFILE.signal(
            &bundle.symbol,
            side,
            bonus,
            atr,
            format!("EMA crossover + MACD + H1 {trend}"),
        )
    }
}
