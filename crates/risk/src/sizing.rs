//! Position sizing and expected-value arithmetic.
//!
//! The win rate is a linear heuristic on confidence, not a calibrated
//! probability.

use common::InstrumentSpec;

/// Hard ceiling on lots per trade, applied after the instrument limits.
pub const MAX_LOT_SIZE: f64 = 5.0;

/// Lot size used when the instrument's broker metadata is unknown.
pub const FALLBACK_LOT_SIZE: f64 = 0.01;

/// 0.7 + (confidence − 50) / 100, clamped to [0.7, 1.3]: 0.7 at or below
/// 50, 1.2 at the confidence cap of 100.
pub fn confidence_multiplier(confidence: u8) -> f64 {
    (0.7 + (f64::from(confidence) - 50.0) / 100.0).clamp(0.7, 1.3)
}

/// 55% at confidence 50 rising linearly to 85% at 100.
pub fn estimated_win_rate(confidence: u8) -> f64 {
    (0.55 + (f64::from(confidence) - 50.0) / 100.0 * 0.30).clamp(0.55, 0.85)
}

/// Lots that risk `balance × risk_per_trade × confidence_multiplier` over
/// the stop distance, snapped to the instrument's volume step and limits.
pub fn position_size(
    symbol: &str,
    stop_loss_pips: f64,
    confidence: u8,
    balance: f64,
    risk_per_trade: f64,
    spec: &InstrumentSpec,
) -> f64 {
    let risk_amount = balance * risk_per_trade * confidence_multiplier(confidence);
    let pip_value = spec.pip_value(symbol);
    let raw = risk_amount / (stop_loss_pips * pip_value);
    let lots = if raw.is_finite() && raw > 0.0 { raw } else { 0.0 };
    spec.normalize_volume(lots).min(MAX_LOT_SIZE)
}

/// Net profit if the target is hit, after round-trip commission.
pub fn expected_profit(lot_size: f64, tp_pips: f64, pip_value: f64, commission_per_lot: f64) -> f64 {
    lot_size * tp_pips * pip_value - lot_size * commission_per_lot
}

/// Total loss if the stop is hit, commission included.
pub fn expected_loss(lot_size: f64, sl_pips: f64, pip_value: f64, commission_per_lot: f64) -> f64 {
    lot_size * sl_pips * pip_value + lot_size * commission_per_lot
}

pub fn expected_value(win_rate: f64, profit: f64, loss: f64) -> f64 {
    win_rate * profit - (1.0 - win_rate) * loss
}
