use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use common::{AccountState, Bar, Error, InstrumentSpec, MarketDataSource, Result, Series, Timeframe};

/// Directory of JSON snapshots written by the broker bridge:
///
/// - `{SYMBOL}_{TF}.json`: array of bars, oldest first
/// - `account.json`: [`AccountState`]
/// - `instruments.json`: map of symbol to [`InstrumentSpec`]
///
/// Files are re-read on every call so each scan sees the latest snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn series_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.root.join(format!("{symbol}_{timeframe}.json"))
    }

    pub fn account(&self) -> Result<AccountState> {
        let path = self.root.join("account.json");
        read_json(&path)?.ok_or_else(|| Error::MarketData(format!("missing {}", path.display())))
    }

    /// Missing file means no metadata: every symbol falls back at ranking.
    pub fn instruments(&self) -> Result<HashMap<String, InstrumentSpec>> {
        let path = self.root.join("instruments.json");
        match read_json(&path)? {
            Some(map) => Ok(map),
            None => {
                warn!(path = %path.display(), "No instrument metadata snapshot");
                Ok(HashMap::new())
            }
        }
    }
}

impl MarketDataSource for SnapshotDir {
    fn series(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Result<Option<Series>> {
        let Some(mut bars) = read_json::<Vec<Bar>>(&self.series_path(symbol, timeframe))? else {
            return Ok(None);
        };
        let start = bars.len().saturating_sub(count);
        bars.drain(..start);
        Series::new(symbol, timeframe, bars).map(Some)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}
