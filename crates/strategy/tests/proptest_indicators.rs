use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use common::Bar;
use strategy::indicators::{
    cluster_levels, FibonacciRetracement, RsiIndicator, StochasticIndicator, WilliamsRIndicator,
};

fn flat_bars(price: f64, n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1.0,
        })
        .collect()
}

proptest! {
    /// Retracement levels run strictly from the swing high down to the swing low.
    #[test]
    fn fibonacci_levels_strictly_decrease(
        low in 0.5f64..200.0,
        range in 0.001f64..50.0,
    ) {
        let fib = FibonacciRetracement::from_swing(low + range, low);
        prop_assert_eq!(fib.fib_0, fib.swing_high);
        prop_assert_eq!(fib.fib_100, fib.swing_low);
        let levels = fib.levels();
        for pair in levels.windows(2) {
            prop_assert!(pair[0] > pair[1], "{:?}", levels);
        }
    }

    /// Clustering levels that are already far apart changes nothing.
    #[test]
    fn clustering_is_idempotent(
        base in 0.5f64..150.0,
        gaps in prop::collection::vec(0.01f64..0.5, 1..12),
    ) {
        let mut levels = vec![base];
        for g in &gaps {
            let last = *levels.last().unwrap();
            levels.push(last * (1.0 + g));
        }
        let once = cluster_levels(&levels, 0.0005);
        let twice = cluster_levels(&once, 0.0005);
        prop_assert_eq!(&once, &levels);
        prop_assert_eq!(once, twice);
    }

    /// A window with no range pins %K at 50 and %R at -50.
    #[test]
    fn oscillators_on_flat_range(price in 0.01f64..10_000.0, n in 16usize..120) {
        let bars = flat_bars(price, n);
        let stoch = StochasticIndicator::default().compute(&bars).unwrap();
        prop_assert_eq!(stoch.k, 50.0);
        prop_assert_eq!(stoch.d, 50.0);
        prop_assert_eq!(WilliamsRIndicator::default().compute(&bars).unwrap(), -50.0);
    }

    /// RSI stays in [0, 100] for any close path.
    #[test]
    fn rsi_is_bounded(closes in prop::collection::vec(0.5f64..2.0, 15..80)) {
        let rsi = RsiIndicator::default().compute(&closes).unwrap();
        prop_assert!((0.0..=100.0).contains(&rsi), "rsi {}", rsi);
    }
}
