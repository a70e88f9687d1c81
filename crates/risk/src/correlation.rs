use serde::{Deserialize, Serialize};

use common::{OpenPosition, OrderSide};

/// Instruments assumed to move together. Opposite-direction positions
/// inside one group fight each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationGroup {
    pub name: String,
    pub symbols: Vec<String>,
}

impl CorrelationGroup {
    pub fn new(name: &str, symbols: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// Broker symbols with the `zero` account suffix.
pub fn default_correlation_groups() -> Vec<CorrelationGroup> {
    vec![
        CorrelationGroup::new("EUR/GBP majors", &["EURUSDzero", "GBPUSDzero", "EURGBPzero"]),
        CorrelationGroup::new("Oceania", &["AUDUSDzero", "NZDUSDzero", "AUDNZDzero"]),
        CorrelationGroup::new("Yen crosses", &["USDJPYzero", "EURJPYzero", "GBPJPYzero"]),
        CorrelationGroup::new("CAD", &["USDCADzero", "CADJPYzero"]),
        CorrelationGroup::new("CHF", &["USDCHFzero", "CHFJPYzero"]),
    ]
}

/// First open position sharing a group with `symbol` but trading the other
/// way. Symbols outside every group never conflict.
pub fn find_conflict<'a>(
    groups: &[CorrelationGroup],
    symbol: &str,
    side: OrderSide,
    open_positions: &'a [OpenPosition],
) -> Option<&'a OpenPosition> {
    let group = groups.iter().find(|g| g.contains(symbol))?;
    open_positions
        .iter()
        .find(|p| group.contains(&p.symbol) && p.side == side.opposite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(symbol: &str, side: OrderSide) -> OpenPosition {
        OpenPosition {
            symbol: symbol.into(),
            side,
        }
    }

    #[test]
    fn opposite_side_in_group_conflicts() {
        let open = vec![position("EURUSDzero", OrderSide::Buy)];
        let hit = find_conflict(&default_correlation_groups(), "GBPUSDzero", OrderSide::Sell, &open);
        assert_eq!(hit.map(|p| p.symbol.as_str()), Some("EURUSDzero"));
    }

    #[test]
    fn open_sell_blocks_buy_in_group() {
        let open = vec![position("USDJPYzero", OrderSide::Sell)];
        let hit = find_conflict(&default_correlation_groups(), "EURJPYzero", OrderSide::Buy, &open);
        assert_eq!(hit.map(|p| p.side), Some(OrderSide::Sell));
    }

    #[test]
    fn same_side_in_group_is_allowed() {
        let open = vec![position("EURUSDzero", OrderSide::Buy)];
        assert!(find_conflict(&default_correlation_groups(), "GBPUSDzero", OrderSide::Buy, &open).is_none());
    }

    #[test]
    fn ungrouped_symbol_never_conflicts() {
        let open = vec![position("EURUSDzero", OrderSide::Buy)];
        assert!(find_conflict(&default_correlation_groups(), "XAUUSD", OrderSide::Sell, &open).is_none());
    }

    #[test]
    fn other_groups_are_ignored() {
        let open = vec![position("USDJPYzero", OrderSide::Buy)];
        assert!(find_conflict(&default_correlation_groups(), "EURUSDzero", OrderSide::Sell, &open).is_none());
    }
}
