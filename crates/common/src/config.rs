use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Process settings loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Snapshot directory the scanner reads bars and account state from
    pub market_data_dir: String,

    // Config file paths
    pub trading_config_path: String,
    pub strategy_config_path: String,

    // Run a single scan cycle and exit
    pub scan_once: bool,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let scan_once = match optional_env("SCAN_ONCE").map(|v| v.to_lowercase()) {
            None => false,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(other) => panic!("ERROR: SCAN_ONCE must be 'true' or 'false', got: '{other}'"),
        };

        Config {
            market_data_dir: required_env("MARKET_DATA_DIR"),
            trading_config_path: optional_env("TRADING_CONFIG_PATH")
                .unwrap_or_else(|| "config/trading.toml".to_string()),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
            scan_once,
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Risk and scanning parameters (`config/trading.toml`).
///
/// Every field has a conservative default, so an empty file is valid apart
/// from the symbol list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Fraction of balance risked per trade (0.005 = 0.5%).
    pub risk_per_trade: f64,
    pub max_concurrent_trades: usize,
    /// Signals below this confidence are discarded before ranking.
    pub min_confidence: u8,
    /// Fractional loss from the day-start balance that halts new entries.
    pub max_daily_loss: f64,
    pub max_hourly_loss: Option<f64>,
    /// Round-trip commission in account currency per lot.
    pub commission_per_lot: f64,
    /// Minimum margin level in percent.
    pub min_margin_level: f64,
    /// Enables the multi-timeframe confluence strategy (needs M15 and H4 bars).
    pub enable_multi_timeframe: bool,
    pub max_trades_per_scan: usize,
    pub scan_interval_secs: u64,
    pub symbols: Vec<String>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.005,
            max_concurrent_trades: 10,
            min_confidence: 50,
            max_daily_loss: 0.03,
            max_hourly_loss: Some(0.01),
            commission_per_lot: 6.0,
            min_margin_level: 500.0,
            enable_multi_timeframe: false,
            max_trades_per_scan: 3,
            scan_interval_secs: 45,
            symbols: Vec::new(),
        }
    }
}

impl TradingConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read '{path}': {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Reject out-of-range parameters, one message per offending field.
    ///
    /// Returns the soft warnings (also logged) when everything is in range.
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !(0.001..=0.05).contains(&self.risk_per_trade) {
            errors.push(format!(
                "risk_per_trade must be between 0.1% and 5%, got {}%",
                self.risk_per_trade * 100.0
            ));
        } else if self.risk_per_trade > 0.02 {
            warnings.push(format!(
                "risk_per_trade is high ({}%) - consider reducing",
                self.risk_per_trade * 100.0
            ));
        }

        if !(1..=20).contains(&self.max_concurrent_trades) {
            errors.push(format!(
                "max_concurrent_trades must be between 1 and 20, got {}",
                self.max_concurrent_trades
            ));
        } else if self.max_concurrent_trades > 15 {
            warnings.push(format!(
                "max_concurrent_trades is high ({}) - may strain margin",
                self.max_concurrent_trades
            ));
        }

        if !(30..=100).contains(&self.min_confidence) {
            errors.push(format!(
                "min_confidence must be between 30 and 100, got {}",
                self.min_confidence
            ));
        } else if self.min_confidence < 45 {
            warnings.push(format!(
                "min_confidence is low ({}) - may generate too many trades",
                self.min_confidence
            ));
        } else if self.min_confidence > 75 {
            warnings.push(format!(
                "min_confidence is high ({}) - may miss opportunities",
                self.min_confidence
            ));
        }

        if !(0.01..=0.10).contains(&self.max_daily_loss) {
            errors.push(format!(
                "max_daily_loss must be between 1% and 10%, got {}%",
                self.max_daily_loss * 100.0
            ));
        } else if self.max_daily_loss > 0.05 {
            warnings.push(format!(
                "max_daily_loss is high ({}%) - consider reducing",
                self.max_daily_loss * 100.0
            ));
        }

        if let Some(hourly) = self.max_hourly_loss {
            if !(0.005..=0.03).contains(&hourly) {
                errors.push(format!(
                    "max_hourly_loss must be between 0.5% and 3%, got {}%",
                    hourly * 100.0
                ));
            } else if hourly * 8.0 > self.max_daily_loss {
                warnings.push(
                    "max_hourly_loss * 8 exceeds max_daily_loss - may hit daily limit quickly"
                        .to_string(),
                );
            }
        }

        if !(0.0..=20.0).contains(&self.commission_per_lot) {
            errors.push(format!(
                "commission_per_lot must be between 0 and 20, got {}",
                self.commission_per_lot
            ));
        } else if self.commission_per_lot > 10.0 {
            warnings.push(format!(
                "commission_per_lot is high ({}) - verify with broker",
                self.commission_per_lot
            ));
        }

        if !(200.0..=2000.0).contains(&self.min_margin_level) {
            errors.push(format!(
                "min_margin_level must be between 200% and 2000%, got {}%",
                self.min_margin_level
            ));
        } else if self.min_margin_level < 300.0 {
            warnings.push(format!(
                "min_margin_level is low ({}%) - risk of margin call",
                self.min_margin_level
            ));
        }

        if self.max_trades_per_scan == 0 {
            errors.push("max_trades_per_scan must be at least 1".to_string());
        }

        if !(15..=300).contains(&self.scan_interval_secs) {
            errors.push(format!(
                "scan_interval_secs must be between 15 and 300, got {}",
                self.scan_interval_secs
            ));
        }

        if self.symbols.is_empty() {
            errors.push("symbols list is empty".to_string());
        } else if self.symbols.len() > 100 {
            warnings.push(format!(
                "symbols list is large ({}) - may slow down scans",
                self.symbols.len()
            ));
        }

        if !errors.is_empty() {
            return Err(Error::InvalidConfig { errors });
        }

        for w in &warnings {
            warn!(warning = %w, "Trading config warning");
        }
        Ok(warnings)
    }
}
