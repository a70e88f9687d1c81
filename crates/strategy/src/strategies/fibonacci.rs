use common::{OrderSide, Signal, StrategyId};

use super::{SeriesBundle, Strategy, StrategyProfile, Trend};
use crate::indicators::fibonacci::DEFAULT_LOOKBACK;
use crate::indicators::{AtrIndicator, FibonacciRetracement, RsiIndicator};

pub const PROFILE: StrategyProfile = StrategyProfile {
    id: StrategyId::FibonacciRetracement,
    base_confidence: 60,
    sl_atr_multiplier: 1.0,
    sl_clamp: (8.0, 20.0),
    tp_multiplier: 2.0,
    tp_clamp: (16.0, 40.0),
    trailing: false,
};

/// Enter with the H1 trend when M5 pulls back to a retracement level.
#[derive(Debug, Clone)]
pub struct FibonacciRetracementStrategy {
    pub lookback: usize,
    pub rsi: RsiIndicator,
    pub atr: AtrIndicator,
    /// Relative distance to a level that counts as a touch.
    pub proximity: f64,
    pub tight_proximity: f64,
}

impl Default for FibonacciRetracementStrategy {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            rsi: RsiIndicator::default(),
            atr: AtrIndicator::default(),
            proximity: 0.0015,
            tight_proximity: 0.001,
        }
    }
}

impl Strategy for FibonacciRetracementStrategy {
    fn id(&self) -> StrategyId {
        PROFILE.id
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let bars = bundle.m5.bars();
        let closes = bundle.m5.closes();

        let fib = FibonacciRetracement::compute(bars, self.lookback).ok()?;
        let rsi = self.rsi.compute(&closes).ok()?;
        let atr = self.atr.compute(bars).ok()?;
        let trend = Trend::of(&bundle.h1)?;
        let price = *closes.last()?;

        let distance = |level: f64| (price - level).abs() / price;
        // Deep level first: 61.8% in an uptrend, 38.2% in a downtrend.
        let key_level = match trend {
            Trend::Bullish => fib.fib_618,
            Trend::Bearish => fib.fib_382,
        };
        let near_key = distance(key_level);
        let near_mid = distance(fib.fib_500);

        if !((near_key < self.proximity || near_mid < self.proximity) && 40.0 < rsi && rsi < 60.0) {
            return None;
        }

        let mut bonus = 0;
        if near_key < self.tight_proximity {
            bonus += 10;
        }
        if 45.0 < rsi && rsi < 55.0 {
            bonus += 8;
        }

        PROFILE.signal(
            &bundle.symbol,
            trend.side(),
            bonus,
            atr,
            format!("Fib retracement in {trend} trend"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixtures::*;
    use common::Timeframe;

    /// Flat base at 1.1000, rally to 1.1100, pull back to the 61.8% level
    /// and chop there.
    fn pullback_closes() -> Vec<f64> {
        let mut closes = vec![1.1; 150];
        closes.extend(linear(1.1, 0.001, 11));
        closes.extend([1.108, 1.106, 1.104]);
        closes.extend((0..16).map(|i| if i % 2 == 0 { 1.1038 } else { 1.1039 }));
        closes
    }

    #[test]
    fn pullback_to_golden_ratio_in_uptrend_buys() {
        let b = bundle(
            series("EURUSD", Timeframe::M5, &pullback_closes(), 0.0),
            rising_h1("EURUSD"),
        );
        let signal = FibonacciRetracementStrategy::default().evaluate(&b).unwrap();
        assert_eq!(signal.side, OrderSide::Buy);
        // tight proximity and RSI 50
        assert_eq!(signal.confidence, 78);
        assert_eq!(signal.stop_loss_pips, 8.0);
        assert_eq!(signal.take_profit_pips, 16.0);
        assert_eq!(signal.reason, "Fib retracement in bullish trend");
    }

    #[test]
    fn far_from_levels_is_none() {
        let mut closes = pullback_closes();
        let n = closes.len();
        closes[n - 1] = 1.1095;
        let b = bundle(
            series("EURUSD", Timeframe::M5, &closes, 0.0),
            rising_h1("EURUSD"),
        );
        assert!(FibonacciRetracementStrategy::default().evaluate(&b).is_none());
    }

    #[test]
    fn short_series_is_none() {
        let b = bundle(
            series("EURUSD", Timeframe::M5, &[1.1; 30], 0.0),
            rising_h1("EURUSD"),
        );
        assert!(FibonacciRetracementStrategy::default().evaluate(&b).is_none());
    }
}
