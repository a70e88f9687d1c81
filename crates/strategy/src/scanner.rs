use tracing::{debug, info, warn};

use common::{MarketDataSource, Opportunity, Series, Timeframe};

use crate::analysis::{analyze, SymbolAnalysis};
use crate::registry::StrategyRegistry;
use crate::strategies::SeriesBundle;

/// Runs every registered strategy over a symbol universe and collects the
/// signals as confidence-ordered opportunities.
pub struct OpportunityScanner {
    registry: StrategyRegistry,
}

impl OpportunityScanner {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Scan `symbols` in order. Symbols without usable data are skipped.
    ///
    /// The result is sorted by confidence, highest first; equal confidences
    /// keep scan order.
    pub fn scan(&self, symbols: &[String], source: &dyn MarketDataSource) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = symbols
            .iter()
            .flat_map(|symbol| self.scan_symbol(symbol, source))
            .collect();

        opportunities.sort_by(|a, b| b.confidence().cmp(&a.confidence()));

        info!(
            symbols = symbols.len(),
            opportunities = opportunities.len(),
            "Scan complete"
        );
        opportunities
    }

    /// Signals for one symbol, in registry order.
    pub fn scan_symbol(&self, symbol: &str, source: &dyn MarketDataSource) -> Vec<Opportunity> {
        let Some(bundle) = self.load_bundle(symbol, source) else {
            return Vec::new();
        };
        let Some(price) = bundle.reference_price() else {
            return Vec::new();
        };

        self.registry
            .evaluate(&bundle)
            .into_iter()
            .map(|signal| {
                debug!(
                    symbol = %symbol,
                    strategy = %signal.strategy,
                    side = %signal.side,
                    confidence = signal.confidence,
                    "Signal"
                );
                Opportunity::new(signal, price)
            })
            .collect()
    }

    /// Fetch the series the registered strategies need.
    ///
    /// `None` when M5 or H1 is missing or too short. M15 and H4 are only
    /// requested when a strategy reads them; if either is unavailable the
    /// bundle is returned without them.
    pub fn load_bundle(&self, symbol: &str, source: &dyn MarketDataSource) -> Option<SeriesBundle> {
        let m5 = fetch(source, symbol, Timeframe::M5)?;
        let h1 = fetch(source, symbol, Timeframe::H1)?;
        let bundle = SeriesBundle::new(m5, h1);

        if !self.registry.needs_multi_timeframe() {
            return Some(bundle);
        }
        match (
            fetch(source, symbol, Timeframe::M15),
            fetch(source, symbol, Timeframe::H4),
        ) {
            (Some(m15), Some(h4)) => Some(bundle.with_higher_timeframes(m15, h4)),
            _ => Some(bundle),
        }
    }

    /// Indicator snapshot and per-strategy outcome for one symbol.
    pub fn analyze_symbol(&self, symbol: &str, source: &dyn MarketDataSource) -> Option<SymbolAnalysis> {
        let bundle = self.load_bundle(symbol, source)?;
        match analyze(&bundle, &self.registry) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Analysis skipped");
                None
            }
        }
    }
}

fn fetch(source: &dyn MarketDataSource, symbol: &str, timeframe: Timeframe) -> Option<Series> {
    match source.series(symbol, timeframe, timeframe.fetch_count()) {
        Ok(Some(series)) if series.len() >= timeframe.min_bars() => Some(series),
        Ok(Some(series)) => {
            debug!(
                symbol = %symbol,
                timeframe = %timeframe,
                bars = series.len(),
                required = timeframe.min_bars(),
                "Series too short, skipping"
            );
            None
        }
        Ok(None) => {
            debug!(symbol = %symbol, timeframe = %timeframe, "No data, skipping");
            None
        }
        Err(e) => {
            warn!(symbol = %symbol, timeframe = %timeframe, error = %e, "Market data fetch failed");
            None
        }
    }
}
