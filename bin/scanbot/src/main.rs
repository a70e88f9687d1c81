mod session;
mod source;

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, Opportunity, TradingConfig};
use risk::{RiskConfig, RiskManager, Selection};
use strategy::{OpportunityScanner, StrategyFileConfig, StrategyRegistry};

use session::SessionTracker;
use source::SnapshotDir;

/// Ranked opportunities logged per cycle.
const LOG_TOP_N: usize = 10;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let trading = TradingConfig::load(&cfg.trading_config_path)
        .unwrap_or_else(|e| panic!("Failed to load trading config: {e}"));
    trading
        .validate()
        .unwrap_or_else(|e| panic!("Trading config rejected: {e}"));
    info!(
        symbols = trading.symbols.len(),
        interval_secs = trading.scan_interval_secs,
        multi_timeframe = trading.enable_multi_timeframe,
        "Scanner starting"
    );

    // ── Strategy registry ─────────────────────────────────────────────────────
    let registry = match StrategyFileConfig::load_optional(&cfg.strategy_config_path) {
        Ok(Some(file)) => StrategyRegistry::from_config(&file, trading.enable_multi_timeframe)
            .unwrap_or_else(|e| panic!("Strategy config rejected: {e}")),
        Ok(None) => {
            info!(path = %cfg.strategy_config_path, "No strategy config, using defaults");
            StrategyRegistry::with_defaults(trading.enable_multi_timeframe)
        }
        Err(e) => panic!("Failed to load strategy config: {e}"),
    };
    info!(strategies = ?registry.ids(), "Strategies loaded");

    let mut bot = ScanBot {
        scanner: OpportunityScanner::new(registry),
        risk: RiskManager::new(RiskConfig::from(&trading)),
        source: SnapshotDir::new(&cfg.market_data_dir),
        session: SessionTracker::new(),
        trading,
    };

    if cfg.scan_once {
        if let Err(e) = bot.run_cycle() {
            error!(error = %e, "Scan cycle failed");
        }
        return;
    }

    // ── Scan loop ─────────────────────────────────────────────────────────────
    let mut ticker = tokio::time::interval(Duration::from_secs(bot.trading.scan_interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = bot.run_cycle() {
                    error!(error = %e, "Scan cycle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting.");
                break;
            }
        }
    }
}

struct ScanBot {
    scanner: OpportunityScanner,
    risk: RiskManager,
    source: SnapshotDir,
    session: SessionTracker,
    trading: TradingConfig,
}

/// One line of stdout per accepted opportunity.
#[derive(Serialize)]
struct Decision<'a> {
    #[serde(flatten)]
    opportunity: &'a Opportunity,
    accepted_at: chrono::DateTime<Utc>,
}

impl ScanBot {
    /// Scan, filter, rank, select. Errors only for an unreadable account
    /// snapshot; per-symbol data problems are logged and skipped.
    fn run_cycle(&mut self) -> anyhow::Result<Selection> {
        let account = self.source.account().context("reading account snapshot")?;
        let instruments = self
            .source
            .instruments()
            .context("reading instrument snapshot")?;
        let now = Utc::now();
        let session = self.session.observe(now, account.balance);

        let found = self.scanner.scan(&self.trading.symbols, &self.source);
        let candidates = self
            .risk
            .filter_by_confidence(found, self.trading.min_confidence);
        let ranked = self.risk.rank_opportunities(candidates, &account, &instruments);

        for (i, opp) in ranked.iter().take(LOG_TOP_N).enumerate() {
            let ranking = opp.ranking.unwrap_or_default();
            info!(
                rank = i + 1,
                symbol = %opp.symbol(),
                side = %opp.side(),
                strategy = %opp.signal.strategy,
                confidence = opp.confidence(),
                lot_size = ranking.lot_size,
                win_rate = ranking.estimated_win_rate,
                expected_value = ranking.expected_value,
                "Ranked opportunity"
            );
        }

        let selection = self.risk.select_for_execution(ranked, &account, &session);
        for opp in &selection.accepted {
            let decision = Decision {
                opportunity: opp,
                accepted_at: now,
            };
            match serde_json::to_string(&decision) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, symbol = %opp.symbol(), "Failed to encode decision"),
            }
        }

        info!(
            balance = account.balance,
            accepted = selection.accepted.len(),
            rejected = selection.rejected.len(),
            "Cycle complete"
        );
        Ok(selection)
    }
}
