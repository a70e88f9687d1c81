use std::collections::HashMap;

use crate::{Result, Series, Timeframe};

/// Abstraction over wherever bars come from (broker terminal, snapshot files).
///
/// The scanner only ever asks for the most recent `count` bars of a series.
/// `Ok(None)` means the source has nothing for that symbol/timeframe; an
/// `Err` is a transport or decoding failure. The scanner treats both as
/// "skip this symbol".
pub trait MarketDataSource {
    fn series(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<Option<Series>>;
}

/// HashMap-backed source, used by tests and by snapshot loaders.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMarketData {
    series: HashMap<(String, Timeframe), Series>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: Series) {
        self.series
            .insert((series.symbol().to_string(), series.timeframe()), series);
    }

    pub fn with(mut self, series: Series) -> Self {
        self.insert(series);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MarketDataSource for InMemoryMarketData {
    fn series(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<Option<Series>> {
        let Some(full) = self.series.get(&(symbol.to_string(), timeframe)) else {
            return Ok(None);
        };
        let bars = full.bars();
        let start = bars.len().saturating_sub(count);
        Series::new(symbol, timeframe, bars[start..].to_vec()).map(Some)
    }
}
