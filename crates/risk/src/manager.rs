use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use common::{
    AccountState, InstrumentSpec, OpenPosition, Opportunity, OrderSide, Ranking, RejectionReason,
    SessionBalances, TradingConfig,
};

use crate::correlation::{default_correlation_groups, find_conflict, CorrelationGroup};
use crate::sizing::{
    estimated_win_rate, expected_loss, expected_profit, expected_value, position_size,
    FALLBACK_LOT_SIZE,
};

/// Risk parameters the ranker and admission gate read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of balance risked per trade (e.g. 0.005 = 0.5%).
    pub risk_per_trade: f64,
    pub max_concurrent_trades: usize,
    /// Loss from the day-start balance that blocks new entries (e.g. 0.03 = 3%).
    pub max_daily_loss: f64,
    pub max_hourly_loss: Option<f64>,
    pub commission_per_lot: f64,
    /// Minimum margin level in percent.
    pub min_margin_level: f64,
    pub max_trades_per_scan: usize,
    pub correlation_groups: Vec<CorrelationGroup>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self::from(&TradingConfig::default())
    }
}

impl From<&TradingConfig> for RiskConfig {
    fn from(cfg: &TradingConfig) -> Self {
        Self {
            risk_per_trade: cfg.risk_per_trade,
            max_concurrent_trades: cfg.max_concurrent_trades,
            max_daily_loss: cfg.max_daily_loss,
            max_hourly_loss: cfg.max_hourly_loss,
            commission_per_lot: cfg.commission_per_lot,
            min_margin_level: cfg.min_margin_level,
            max_trades_per_scan: cfg.max_trades_per_scan,
            correlation_groups: default_correlation_groups(),
        }
    }
}

/// Outcome of walking a ranked list through the admission gate.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub accepted: Vec<Opportunity>,
    pub rejected: Vec<(Opportunity, RejectionReason)>,
}

/// Converts confidence-ordered opportunities into EV-ordered ones and
/// decides which of them may be opened.
///
/// Holds no account state: every call takes the snapshot it needs.
#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Attach lot size, win rate and expected value to each opportunity and
    /// sort by expected value, highest first. Ties keep input order.
    ///
    /// An opportunity whose instrument metadata is missing gets the
    /// fallback lot size and an expected value of zero.
    pub fn rank_opportunities(
        &self,
        opportunities: Vec<Opportunity>,
        account: &AccountState,
        instruments: &HashMap<String, InstrumentSpec>,
    ) -> Vec<Opportunity> {
        let mut ranked: Vec<Opportunity> = opportunities
            .into_iter()
            .map(|mut opp| {
                opp.ranking = Some(self.rank_one(&opp, account, instruments.get(opp.symbol())));
                opp
            })
            .collect();

        ranked.sort_by(|a, b| {
            let ev = |o: &Opportunity| o.expected_value().unwrap_or(0.0);
            ev(b).total_cmp(&ev(a))
        });
        ranked
    }

    fn rank_one(
        &self,
        opp: &Opportunity,
        account: &AccountState,
        spec: Option<&InstrumentSpec>,
    ) -> Ranking {
        let signal = &opp.signal;
        let win_rate = estimated_win_rate(signal.confidence);

        let Some(spec) = spec else {
            warn!(symbol = %signal.symbol, "No instrument metadata, using fallback lot size");
            return Ranking {
                estimated_win_rate: win_rate,
                lot_size: FALLBACK_LOT_SIZE,
                expected_value: 0.0,
            };
        };

        let lot_size = position_size(
            &signal.symbol,
            signal.stop_loss_pips,
            signal.confidence,
            account.balance,
            self.config.risk_per_trade,
            spec,
        );
        let pip_value = spec.pip_value(&signal.symbol);
        let commission = self.config.commission_per_lot;
        let profit = expected_profit(lot_size, signal.take_profit_pips, pip_value, commission);
        let loss = expected_loss(lot_size, signal.stop_loss_pips, pip_value, commission);
        Ranking {
            estimated_win_rate: win_rate,
            lot_size,
            expected_value: expected_value(win_rate, profit, loss),
        }
    }

    /// Drop opportunities below `min_confidence`, keeping order.
    pub fn filter_by_confidence(
        &self,
        opportunities: Vec<Opportunity>,
        min_confidence: u8,
    ) -> Vec<Opportunity> {
        opportunities
            .into_iter()
            .filter(|o| o.confidence() >= min_confidence)
            .collect()
    }

    // ─── Admission gate ───────────────────────────────────────────────────────

    /// Blocks when the balance is down `max_daily_loss` or more from the
    /// day start. A non-positive day-start balance always blocks.
    pub fn check_daily_loss(&self, balance: f64, day_start: f64) -> Result<(), RejectionReason> {
        if day_start <= 0.0 {
            return Err(RejectionReason::DailyLossLimit { pnl_pct: -1.0 });
        }
        let pnl_pct = (balance - day_start) / day_start;
        if pnl_pct <= -self.config.max_daily_loss {
            return Err(RejectionReason::DailyLossLimit { pnl_pct });
        }
        Ok(())
    }

    /// Only active when both the limit and an hour-start balance are known.
    pub fn check_hourly_loss(
        &self,
        balance: f64,
        hour_start: Option<f64>,
    ) -> Result<(), RejectionReason> {
        let (Some(limit), Some(start)) = (self.config.max_hourly_loss, hour_start) else {
            return Ok(());
        };
        if start <= 0.0 {
            return Ok(());
        }
        let pnl_pct = (balance - start) / start;
        if pnl_pct <= -limit {
            return Err(RejectionReason::HourlyLossLimit { pnl_pct });
        }
        Ok(())
    }

    /// An account with no used margin always passes.
    pub fn check_margin(&self, account: &AccountState) -> Result<(), RejectionReason> {
        if account.margin == 0.0 {
            return Ok(());
        }
        if account.margin_level < self.config.min_margin_level {
            return Err(RejectionReason::InsufficientMargin {
                margin_level: account.margin_level,
            });
        }
        Ok(())
    }

    pub fn check_correlation_conflict<'a>(
        &self,
        symbol: &str,
        side: OrderSide,
        open_positions: &'a [OpenPosition],
    ) -> Option<&'a OpenPosition> {
        find_conflict(&self.config.correlation_groups, symbol, side, open_positions)
    }

    /// Daily loss, hourly loss, margin, concurrency, correlation; the first
    /// failing check is returned.
    pub fn can_open_new_position(
        &self,
        symbol: &str,
        side: OrderSide,
        account: &AccountState,
        session: &SessionBalances,
    ) -> Result<(), RejectionReason> {
        self.check_daily_loss(account.balance, session.day_start)?;
        self.check_hourly_loss(account.balance, session.hour_start)?;
        self.check_margin(account)?;

        if account.open_positions.len() >= self.config.max_concurrent_trades {
            return Err(RejectionReason::MaxConcurrentTrades {
                max: self.config.max_concurrent_trades,
            });
        }

        if let Some(existing) = self.check_correlation_conflict(symbol, side, &account.open_positions) {
            return Err(RejectionReason::CorrelationConflict {
                existing_symbol: existing.symbol.clone(),
                existing_side: existing.side,
            });
        }
        Ok(())
    }

    /// Run the top `max_trades_per_scan` ranked candidates through the
    /// admission gate. A rejected candidate leaves its slot empty; nothing
    /// below the cut is considered.
    ///
    /// Each accepted candidate counts as an open position for the ones after it.
    pub fn select_for_execution(
        &self,
        ranked: Vec<Opportunity>,
        account: &AccountState,
        session: &SessionBalances,
    ) -> Selection {
        let mut working = account.clone();
        let mut selection = Selection::default();

        for opp in ranked.into_iter().take(self.config.max_trades_per_scan) {
            match self.can_open_new_position(opp.symbol(), opp.side(), &working, session) {
                Ok(()) => {
                    info!(
                        symbol = %opp.symbol(),
                        side = %opp.side(),
                        strategy = %opp.signal.strategy,
                        confidence = opp.confidence(),
                        expected_value = opp.expected_value().unwrap_or(0.0),
                        "Opportunity accepted"
                    );
                    working.open_positions.push(OpenPosition {
                        symbol: opp.symbol().to_string(),
                        side: opp.side(),
                    });
                    selection.accepted.push(opp);
                }
                Err(reason) => {
                    info!(symbol = %opp.symbol(), reason = %reason, "Opportunity rejected");
                    selection.rejected.push((opp, reason));
                }
            }
        }

        debug!(
            accepted = selection.accepted.len(),
            rejected = selection.rejected.len(),
            "Selection complete"
        );
        selection
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Signal, StrategyId};

    fn opportunity(symbol: &str, side: OrderSide, confidence: u8, sl: f64, tp: f64) -> Opportunity {
        Opportunity::new(
            Signal {
                symbol: symbol.into(),
                side,
                confidence,
                stop_loss_pips: sl,
                take_profit_pips: tp,
                strategy: StrategyId::Momentum,
                reason: "test".into(),
                trailing_stop_pips: None,
            },
            1.1,
        )
    }

    fn account(balance: f64) -> AccountState {
        AccountState {
            balance,
            equity: balance,
            margin: 0.0,
            margin_level: 0.0,
            open_positions: Vec::new(),
        }
    }

    fn session(day_start: f64) -> SessionBalances {
        SessionBalances {
            day_start,
            hour_start: None,
        }
    }

    fn instruments(symbols: &[&str]) -> HashMap<String, InstrumentSpec> {
        symbols
            .iter()
            .map(|s| (s.to_string(), InstrumentSpec::default()))
            .collect()
    }

    fn manager() -> RiskManager {
        RiskManager::new(RiskConfig::default())
    }

    #[test]
    fn ranking_reorders_by_expected_value() {
        let opps = vec![
            opportunity("AAA", OrderSide::Buy, 80, 25.0, 45.0),
            opportunity("BBB", OrderSide::Buy, 60, 6.0, 25.0),
        ];
        let ranked = manager().rank_opportunities(opps, &account(10_000.0), &instruments(&["AAA", "BBB"]));

        assert_eq!(ranked[0].symbol(), "BBB");
        let a = ranked[1].ranking.unwrap();
        let b = ranked[0].ranking.unwrap();
        assert!((a.lot_size - 0.2).abs() < 1e-9);
        assert!((a.expected_value - 38.4).abs() < 1e-6);
        assert!((b.lot_size - 0.67).abs() < 1e-9);
        assert!((b.expected_value - 76.246).abs() < 1e-6);
        assert!((b.estimated_win_rate - 0.58).abs() < 1e-12);
    }

    #[test]
    fn equal_expected_value_keeps_scan_order() {
        let opps = vec![
            opportunity("AAA", OrderSide::Buy, 70, 10.0, 20.0),
            opportunity("BBB", OrderSide::Sell, 70, 10.0, 20.0),
        ];
        let ranked = manager().rank_opportunities(opps, &account(10_000.0), &instruments(&["AAA", "BBB"]));
        assert_eq!(ranked[0].symbol(), "AAA");
        assert_eq!(ranked[1].symbol(), "BBB");
    }

    #[test]
    fn missing_instrument_gets_fallback() {
        let opps = vec![opportunity("UNKNOWN", OrderSide::Buy, 90, 10.0, 20.0)];
        let ranked = manager().rank_opportunities(opps, &account(10_000.0), &HashMap::new());
        let r = ranked[0].ranking.unwrap();
        assert_eq!(r.lot_size, FALLBACK_LOT_SIZE);
        assert_eq!(r.expected_value, 0.0);
    }

    #[test]
    fn confidence_filter_is_inclusive() {
        let opps = vec![
            opportunity("AAA", OrderSide::Buy, 49, 10.0, 20.0),
            opportunity("BBB", OrderSide::Buy, 50, 10.0, 20.0),
        ];
        let kept = manager().filter_by_confidence(opps, 50);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].symbol(), "BBB");
    }

    #[test]
    fn daily_loss_boundary_is_blocked() {
        let m = manager();
        assert!(matches!(
            m.check_daily_loss(9_700.0, 10_000.0),
            Err(RejectionReason::DailyLossLimit { .. })
        ));
        assert!(m.check_daily_loss(9_699.0, 10_000.0).is_err());
        assert!(m.check_daily_loss(9_701.0, 10_000.0).is_ok());
        assert!(m.check_daily_loss(9_701.0, 0.0).is_err());
    }

    #[test]
    fn hourly_gate_needs_limit_and_start() {
        let m = manager();
        assert!(m.check_hourly_loss(9_800.0, None).is_ok());
        assert!(matches!(
            m.check_hourly_loss(9_899.0, Some(10_000.0)),
            Err(RejectionReason::HourlyLossLimit { .. })
        ));
        assert!(m.check_hourly_loss(9_950.0, Some(10_000.0)).is_ok());

        let no_limit = RiskManager::new(RiskConfig {
            max_hourly_loss: None,
            ..RiskConfig::default()
        });
        assert!(no_limit.check_hourly_loss(5_000.0, Some(10_000.0)).is_ok());
    }

    #[test]
    fn zero_margin_always_passes() {
        let m = manager();
        let mut acct = account(10_000.0);
        acct.margin_level = 0.0;
        assert!(m.check_margin(&acct).is_ok());
        acct.margin = 100.0;
        acct.margin_level = 450.0;
        assert!(matches!(
            m.check_margin(&acct),
            Err(RejectionReason::InsufficientMargin { .. })
        ));
        acct.margin_level = 500.0;
        assert!(m.check_margin(&acct).is_ok());
    }

    #[test]
    fn gates_apply_in_order() {
        let m = RiskManager::new(RiskConfig {
            max_concurrent_trades: 1,
            ..RiskConfig::default()
        });
        let mut acct = account(9_000.0);
        acct.margin = 100.0;
        acct.margin_level = 100.0;
        acct.open_positions.push(OpenPosition {
            symbol: "EURUSDzero".into(),
            side: OrderSide::Buy,
        });

        // every gate fails: daily loss wins
        let err = m
            .can_open_new_position("GBPUSDzero", OrderSide::Sell, &acct, &session(10_000.0))
            .unwrap_err();
        assert!(matches!(err, RejectionReason::DailyLossLimit { .. }));

        acct.balance = 10_000.0;
        let err = m
            .can_open_new_position("GBPUSDzero", OrderSide::Sell, &acct, &session(10_000.0))
            .unwrap_err();
        assert!(matches!(err, RejectionReason::InsufficientMargin { .. }));

        acct.margin_level = 1_000.0;
        let err = m
            .can_open_new_position("GBPUSDzero", OrderSide::Sell, &acct, &session(10_000.0))
            .unwrap_err();
        assert_eq!(err, RejectionReason::MaxConcurrentTrades { max: 1 });
    }

    #[test]
    fn correlation_conflict_only_for_opposite_side() {
        let m = manager();
        let mut acct = account(10_000.0);
        acct.open_positions.push(OpenPosition {
            symbol: "EURUSDzero".into(),
            side: OrderSide::Buy,
        });

        let err = m
            .can_open_new_position("GBPUSDzero", OrderSide::Sell, &acct, &session(10_000.0))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "correlation conflict with open BUY on EURUSDzero"
        );
        assert!(m
            .can_open_new_position("GBPUSDzero", OrderSide::Buy, &acct, &session(10_000.0))
            .is_ok());
    }

    #[test]
    fn selection_respects_quota_and_earlier_picks() {
        let m = RiskManager::new(RiskConfig {
            max_trades_per_scan: 3,
            ..RiskConfig::default()
        });
        let ranked = vec![
            opportunity("EURUSDzero", OrderSide::Buy, 80, 10.0, 20.0),
            opportunity("USDJPYzero", OrderSide::Buy, 75, 10.0, 20.0),
            opportunity("AUDUSDzero", OrderSide::Sell, 70, 10.0, 20.0),
            opportunity("XAUUSDzero", OrderSide::Buy, 65, 10.0, 20.0),
        ];
        let selection = m.select_for_execution(ranked, &account(10_000.0), &session(10_000.0));

        let accepted: Vec<&str> = selection.accepted.iter().map(|o| o.symbol()).collect();
        assert_eq!(accepted, vec!["EURUSDzero", "USDJPYzero", "AUDUSDzero"]);
        assert!(selection.rejected.is_empty());
    }

    #[test]
    fn rejected_slot_is_not_refilled_from_below_the_cut() {
        let m = RiskManager::new(RiskConfig {
            max_trades_per_scan: 3,
            ..RiskConfig::default()
        });
        let ranked = vec![
            opportunity("EURUSDzero", OrderSide::Buy, 80, 10.0, 20.0),
            opportunity("GBPUSDzero", OrderSide::Sell, 75, 10.0, 20.0),
            opportunity("USDJPYzero", OrderSide::Buy, 70, 10.0, 20.0),
            opportunity("XAUUSDzero", OrderSide::Buy, 65, 10.0, 20.0),
        ];
        let selection = m.select_for_execution(ranked, &account(10_000.0), &session(10_000.0));

        let accepted: Vec<&str> = selection.accepted.iter().map(|o| o.symbol()).collect();
        assert_eq!(accepted, vec!["EURUSDzero", "USDJPYzero"]);
        assert_eq!(selection.rejected.len(), 1);
        assert_eq!(selection.rejected[0].0.symbol(), "GBPUSDzero");
        assert!(matches!(
            selection.rejected[0].1,
            RejectionReason::CorrelationConflict { .. }
        ));
    }

    #[test]
    fn selection_counts_accepted_toward_concurrency() {
        let m = RiskManager::new(RiskConfig {
            max_concurrent_trades: 1,
            max_trades_per_scan: 3,
            ..RiskConfig::default()
        });
        let ranked = vec![
            opportunity("XAUUSD", OrderSide::Buy, 80, 10.0, 20.0),
            opportunity("EURUSD", OrderSide::Buy, 75, 10.0, 20.0),
        ];
        let selection = m.select_for_execution(ranked, &account(10_000.0), &session(10_000.0));
        assert_eq!(selection.accepted.len(), 1);
        assert_eq!(
            selection.rejected[0].1,
            RejectionReason::MaxConcurrentTrades { max: 1 }
        );
    }
}
