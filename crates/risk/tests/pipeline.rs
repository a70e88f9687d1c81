//! Scanner output fed through ranking and selection.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use common::{
    AccountState, Bar, InMemoryMarketData, InstrumentSpec, OrderSide, SessionBalances, Series,
    Signal, StrategyId, Timeframe,
};
use risk::sizing::FALLBACK_LOT_SIZE;
use risk::{RiskConfig, RiskManager};
use strategy::{OpportunityScanner, SeriesBundle, Strategy, StrategyRegistry};

fn series(symbol: &str, tf: Timeframe, len: usize) -> Series {
    let bars = (0..len)
        .map(|i| Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
            open: 1.25,
            high: 1.25,
            low: 1.25,
            close: 1.25,
            volume: 100.0,
        })
        .collect();
    Series::new(symbol, tf, bars).unwrap()
}

/// Emits a BUY with a fixed (confidence, stop, target) per symbol.
struct Scripted {
    by_symbol: HashMap<String, (u8, f64, f64)>,
}

impl Strategy for Scripted {
    fn id(&self) -> StrategyId {
        StrategyId::Breakout
    }

    fn evaluate(&self, bundle: &SeriesBundle) -> Option<Signal> {
        let &(confidence, sl, tp) = self.by_symbol.get(&bundle.symbol)?;
        Some(Signal {
            symbol: bundle.symbol.clone(),
            side: OrderSide::Buy,
            confidence,
            stop_loss_pips: sl,
            take_profit_pips: tp,
            strategy: StrategyId::Breakout,
            reason: "scripted".into(),
            trailing_stop_pips: None,
        })
    }
}

fn account() -> AccountState {
    AccountState {
        balance: 10_000.0,
        equity: 10_000.0,
        margin: 0.0,
        margin_level: 0.0,
        open_positions: Vec::new(),
    }
}

#[test]
fn expected_value_reorders_scanner_output() {
    let script = [
        ("AAA", (80, 25.0, 45.0)),
        ("BBB", (65, 6.0, 25.0)),
        ("CCC", (58, 10.0, 12.0)),
        ("DDD", (90, 10.0, 20.0)),
    ];
    let mut source = InMemoryMarketData::new();
    for (symbol, _) in &script {
        source.insert(series(symbol, Timeframe::M5, 200));
        source.insert(series(symbol, Timeframe::H1, 100));
    }
    let registry = StrategyRegistry::from_strategies(vec![Box::new(Scripted {
        by_symbol: script.iter().map(|(s, v)| (s.to_string(), *v)).collect(),
    })]);
    let scanner = OpportunityScanner::new(registry);
    let symbols: Vec<String> = ["CCC", "BBB", "AAA", "DDD"].iter().map(|s| s.to_string()).collect();

    let scanned = scanner.scan(&symbols, &source);
    let by_confidence: Vec<&str> = scanned.iter().map(|o| o.symbol()).collect();
    assert_eq!(by_confidence, vec!["DDD", "AAA", "BBB", "CCC"]);

    // DDD has no broker metadata
    let instruments: HashMap<String, InstrumentSpec> = ["AAA", "BBB", "CCC"]
        .iter()
        .map(|s| (s.to_string(), InstrumentSpec::default()))
        .collect();
    let manager = RiskManager::new(RiskConfig::default());
    let candidates = manager.filter_by_confidence(scanned, 50);
    let ranked = manager.rank_opportunities(candidates, &account(), &instruments);

    let by_value: Vec<&str> = ranked.iter().map(|o| o.symbol()).collect();
    assert_eq!(by_value, vec!["BBB", "AAA", "CCC", "DDD"]);

    let ranking = |symbol: &str| {
        ranked
            .iter()
            .find(|o| o.symbol() == symbol)
            .and_then(|o| o.ranking)
            .unwrap()
    };
    assert!((ranking("AAA").lot_size - 0.2).abs() < 1e-9);
    assert!((ranking("AAA").expected_value - 38.4).abs() < 1e-6);
    assert!((ranking("BBB").lot_size - 0.71).abs() < 1e-9);
    assert!(ranking("BBB").expected_value > ranking("AAA").expected_value);
    assert!((ranking("CCC").lot_size - 0.39).abs() < 1e-9);
    assert_eq!(ranking("DDD").lot_size, FALLBACK_LOT_SIZE);
    assert_eq!(ranking("DDD").expected_value, 0.0);
    assert!((ranking("DDD").estimated_win_rate - 0.67).abs() < 1e-12);

    let session = SessionBalances {
        day_start: 10_000.0,
        hour_start: Some(10_000.0),
    };
    let selection = manager.select_for_execution(ranked, &account(), &session);
    let accepted: Vec<&str> = selection.accepted.iter().map(|o| o.symbol()).collect();
    assert_eq!(accepted, vec!["BBB", "AAA", "CCC"]);
    assert!(selection.rejected.is_empty());
    assert!(selection.accepted.iter().all(|o| o.reference_price == 1.25));
}

#[test]
fn confidence_filter_runs_before_ranking() {
    let mut source = InMemoryMarketData::new();
    for symbol in ["AAA", "BBB"] {
        source.insert(series(symbol, Timeframe::M5, 200));
        source.insert(series(symbol, Timeframe::H1, 100));
    }
    let registry = StrategyRegistry::from_strategies(vec![Box::new(Scripted {
        by_symbol: [("AAA".to_string(), (70, 10.0, 20.0)), ("BBB".to_string(), (45, 5.0, 40.0))]
            .into_iter()
            .collect(),
    })]);
    let scanned = OpportunityScanner::new(registry).scan(&["AAA".into(), "BBB".into()], &source);
    assert_eq!(scanned.len(), 2);

    let manager = RiskManager::new(RiskConfig::default());
    let instruments: HashMap<String, InstrumentSpec> = ["AAA", "BBB"]
        .iter()
        .map(|s| (s.to_string(), InstrumentSpec::default()))
        .collect();
    let ranked = manager.rank_opportunities(manager.filter_by_confidence(scanned, 50), &account(), &instruments);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].symbol(), "AAA");
}
