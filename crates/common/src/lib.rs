pub mod config;
pub mod error;
pub mod instrument;
pub mod market;
pub mod types;

pub use config::{Config, TradingConfig};
pub use error::{Error, Result};
pub use instrument::{pip_size, InstrumentClass, InstrumentSpec};
pub use market::{InMemoryMarketData, MarketDataSource};
pub use types::*;
