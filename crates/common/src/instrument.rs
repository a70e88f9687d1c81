use serde::{Deserialize, Serialize};

/// Pip convention family, resolved from the symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    /// Yen-quoted pairs: pip = 0.01.
    Yen,
    /// Gold and other metals: pip = 0.10.
    Metal,
    /// Everything else: pip = 0.0001.
    Standard,
}

/// Substring patterns checked in order; first hit wins.
const CLASS_TABLE: &[(&str, InstrumentClass)] = &[
    ("JPY", InstrumentClass::Yen),
    ("XAU", InstrumentClass::Metal),
    ("GOLD", InstrumentClass::Metal),
];

impl InstrumentClass {
    pub fn of(symbol: &str) -> Self {
        let upper = symbol.to_uppercase();
        CLASS_TABLE
            .iter()
            .find(|(pattern, _)| upper.contains(pattern))
            .map(|(_, class)| *class)
            .unwrap_or(InstrumentClass::Standard)
    }

    pub fn pip_size(self) -> f64 {
        match self {
            InstrumentClass::Yen => 0.01,
            InstrumentClass::Metal => 0.10,
            InstrumentClass::Standard => 0.0001,
        }
    }

    /// Broker tick value → value of one pip for one lot.
    pub fn pip_value_multiplier(self) -> f64 {
        match self {
            InstrumentClass::Yen => 1000.0,
            InstrumentClass::Metal | InstrumentClass::Standard => 10.0,
        }
    }
}

pub fn pip_size(symbol: &str) -> f64 {
    InstrumentClass::of(symbol).pip_size()
}

/// Broker metadata for a tradeable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub volume_min: f64,
    pub volume_max: f64,
    pub volume_step: f64,
    /// Account-currency value of one tick for one lot.
    pub tick_value: f64,
}

impl Default for InstrumentSpec {
    fn default() -> Self {
        Self {
            volume_min: 0.01,
            volume_max: 100.0,
            volume_step: 0.01,
            tick_value: 1.0,
        }
    }
}

impl InstrumentSpec {
    pub fn pip_value(&self, symbol: &str) -> f64 {
        self.tick_value * InstrumentClass::of(symbol).pip_value_multiplier()
    }

    /// Round to the volume step, then clamp to [volume_min, volume_max].
    pub fn normalize_volume(&self, lots: f64) -> f64 {
        let stepped = if self.volume_step > 0.0 {
            (lots / self.volume_step).round() * self.volume_step
        } else {
            lots
        };
        stepped.max(self.volume_min).min(self.volume_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_symbol_pattern() {
        assert_eq!(InstrumentClass::of("USDJPYzero"), InstrumentClass::Yen);
        assert_eq!(InstrumentClass::of("XAUUSD"), InstrumentClass::Metal);
        assert_eq!(InstrumentClass::of("gold"), InstrumentClass::Metal);
        assert_eq!(InstrumentClass::of("EURUSDzero"), InstrumentClass::Standard);
    }

    #[test]
    fn pip_value_scales_tick_value() {
        let spec = InstrumentSpec { tick_value: 0.67, ..InstrumentSpec::default() };
        assert!((spec.pip_value("EURJPY") - 670.0).abs() < 1e-9);
        assert!((spec.pip_value("EURUSD") - 6.7).abs() < 1e-9);
    }

    #[test]
    fn normalize_volume_rounds_then_clamps() {
        let spec = InstrumentSpec::default();
        assert!((spec.normalize_volume(0.456) - 0.46).abs() < 1e-9);
        assert!((spec.normalize_volume(0.001) - 0.01).abs() < 1e-9);
        assert!((spec.normalize_volume(500.0) - 100.0).abs() < 1e-9);
    }
}
