use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use common::Result;

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "mean_reversion"
///
/// [strategy.params]
/// rsi_oversold = 30.0
///
/// [[strategy]]
/// type = "breakout"
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier, e.g. "trend_following" or "momentum".
    #[serde(rename = "type")]
    pub strategy_type: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Indicator-specific parameter overrides.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

fn enabled_by_default() -> bool {
    true
}

impl StrategyFileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_defaults_to_true() {
        let cfg = StrategyFileConfig::from_toml_str(
            r#"
            [[strategy]]
            type = "momentum"

            [[strategy]]
            type = "breakout"
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.strategies.len(), 2);
        assert!(cfg.strategies[0].enabled);
        assert!(!cfg.strategies[1].enabled);
    }

    #[test]
    fn params_are_kept_raw() {
        let cfg = StrategyFileConfig::from_toml_str(
            r#"
            [[strategy]]
            type = "trend_following"
            [strategy.params]
            fast = 8
            volume_spike = 1.3
            "#,
        )
        .unwrap();
        let params = &cfg.strategies[0].params;
        assert_eq!(params["fast"].as_integer(), Some(8));
        assert_eq!(params["volume_spike"].as_float(), Some(1.3));
    }

    #[test]
    fn empty_file_has_no_strategies() {
        assert!(StrategyFileConfig::from_toml_str("").unwrap().strategies.is_empty());
    }

    #[test]
    fn missing_file_is_none() {
        let loaded = StrategyFileConfig::load_optional("/nonexistent/strategies.toml").unwrap();
        assert!(loaded.is_none());
    }
}
