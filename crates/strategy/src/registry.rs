use std::collections::HashMap;

use tracing::info;

use common::{Error, Result, Signal, StrategyId, Timeframe};

use crate::config::{StrategyConfig, StrategyFileConfig};
use crate::indicators::{BollingerIndicator, CciIndicator, RsiIndicator, StochasticIndicator, WilliamsRIndicator};
use crate::strategies::{
    Breakout, FibonacciRetracementStrategy, MeanReversion, Momentum, MultiTimeframeConfluence,
    SeriesBundle, Strategy, TrendFollowing,
};

/// Holds all active strategy instances and runs them against a symbol's data.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Build the registry from config. Unknown types and bad parameters are
    /// collected and reported together.
    ///
    /// Multi-timeframe confluence is only built when `enable_multi_timeframe`
    /// is set, whatever the file says.
    pub fn from_config(file_cfg: &StrategyFileConfig, enable_multi_timeframe: bool) -> Result<Self> {
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        let mut errors = Vec::new();

        for cfg in file_cfg.strategies.iter().filter(|c| c.enabled) {
            match build_strategy(cfg) {
                Ok(strategy) if strategy.id() == StrategyId::MultiTimeframeConfluence && !enable_multi_timeframe => {
                    info!("Multi-timeframe confluence configured but disabled in trading config");
                }
                Ok(strategy) => {
                    info!(name = %strategy.name(), "Registered strategy");
                    strategies.push(strategy);
                }
                Err(e) => errors.push(format!("strategy '{}': {e}", cfg.strategy_type)),
            }
        }

        if !errors.is_empty() {
            return Err(Error::InvalidConfig { errors });
        }
        Ok(Self { strategies })
    }

    /// Every strategy with default parameters, in `StrategyId::ALL` order.
    /// Confluence is left out unless `enable_multi_timeframe` is set.
    pub fn with_defaults(enable_multi_timeframe: bool) -> Self {
        let strategies = StrategyId::ALL
            .into_iter()
            .filter(|id| enable_multi_timeframe || *id != StrategyId::MultiTimeframeConfluence)
            .map(default_strategy)
            .collect();
        Self { strategies }
    }

    pub fn from_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn ids(&self) -> Vec<StrategyId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// True when any registered strategy reads M15 or H4.
    pub fn needs_multi_timeframe(&self) -> bool {
        self.strategies.iter().any(|s| {
            s.timeframes()
                .iter()
                .any(|tf| matches!(tf, Timeframe::M15 | Timeframe::H4))
        })
    }

    /// Every signal the registered strategies produce, in registration order.
    pub fn evaluate(&self, bundle: &SeriesBundle) -> Vec<Signal> {
        self.strategies
            .iter()
            .filter_map(|s| s.evaluate(bundle))
            .collect()
    }

    /// Outcome of each strategy, including the ones that did not fire.
    pub fn outcomes(&self, bundle: &SeriesBundle) -> Vec<(StrategyId, Option<Signal>)> {
        self.strategies
            .iter()
            .map(|s| (s.id(), s.evaluate(bundle)))
            .collect()
    }
}

// ─── Strategy builders ────────────────────────────────────────────────────────

fn default_strategy(id: StrategyId) -> Box<dyn Strategy> {
    match id {
        StrategyId::TrendFollowing => Box::new(TrendFollowing::default()),
        StrategyId::FibonacciRetracement => Box::new(FibonacciRetracementStrategy::default()),
        StrategyId::MeanReversion => Box::new(MeanReversion::default()),
        StrategyId::Breakout => Box::new(Breakout::default()),
        StrategyId::Momentum => Box::new(Momentum::default()),
        StrategyId::MultiTimeframeConfluence => Box::new(MultiTimeframeConfluence::default()),
    }
}

fn build_strategy(cfg: &StrategyConfig) -> std::result::Result<Box<dyn Strategy>, String> {
    let p = &cfg.params;
    match cfg.strategy_type.as_str() {
        "trend_following" => {
            let mut s = TrendFollowing::default();
            s.fast_period = param_usize(p, "fast", s.fast_period);
            s.slow_period = param_usize(p, "slow", s.slow_period);
            s.volume_spike = param_f64(p, "volume_spike", s.volume_spike);
            if s.fast_period == 0 || s.fast_period >= s.slow_period {
                return Err(format!(
                    "fast period {} must be positive and below slow period {}",
                    s.fast_period, s.slow_period
                ));
            }
            Ok(Box::new(s))
        }
        "fibonacci_retracement" => {
            let mut s = FibonacciRetracementStrategy::default();
            s.lookback = param_usize(p, "lookback", s.lookback);
            s.proximity = param_f64(p, "proximity", s.proximity);
            if s.lookback < 2 {
                return Err(format!("lookback {} must be at least 2", s.lookback));
            }
            Ok(Box::new(s))
        }
        "mean_reversion" => {
            let mut s = MeanReversion::default();
            let period = param_usize(p, "bb_period", s.bollinger.period);
            let std_dev = param_f64(p, "bb_std_dev", s.bollinger.std_dev);
            let oversold = param_f64(p, "rsi_oversold", s.rsi.oversold);
            let overbought = param_f64(p, "rsi_overbought", s.rsi.overbought);
            if period < 2 {
                return Err(format!("bb_period {period} must be at least 2"));
            }
            if oversold >= overbought {
                return Err(format!("rsi_oversold {oversold} must be below rsi_overbought {overbought}"));
            }
            s.bollinger = BollingerIndicator::new(period, std_dev);
            s.rsi = RsiIndicator::new(s.rsi.period, overbought, oversold);
            Ok(Box::new(s))
        }
        "breakout" => {
            let mut s = Breakout::default();
            s.volume_spike = param_f64(p, "volume_spike", s.volume_spike);
            s.strong_volume = param_f64(p, "strong_volume", s.strong_volume);
            Ok(Box::new(s))
        }
        "momentum" => {
            let mut s = Momentum::default();
            let k = param_usize(p, "stoch_k", s.stochastic.k_period);
            let cci = param_usize(p, "cci_period", s.cci.period);
            let wr = param_usize(p, "williams_period", s.williams.period);
            if k == 0 || cci == 0 || wr == 0 {
                return Err("oscillator periods must be positive".to_string());
            }
            s.stochastic = StochasticIndicator::new(k, s.stochastic.d_period);
            s.cci = CciIndicator::new(cci);
            s.williams = WilliamsRIndicator::new(wr);
            Ok(Box::new(s))
        }
        "multi_timeframe_confluence" => Ok(Box::new(MultiTimeframeConfluence::default())),
        other => Err(format!("unknown type '{other}'")),
    }
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .unwrap_or(default)
}

fn param_usize(params: &HashMap<String, toml::Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
