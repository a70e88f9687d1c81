pub mod analysis;
pub mod config;
pub mod indicators;
pub mod registry;
pub mod scanner;
pub mod strategies;

pub use analysis::{analyze, SymbolAnalysis};
pub use config::{StrategyConfig, StrategyFileConfig};
pub use registry::StrategyRegistry;
pub use scanner::OpportunityScanner;
pub use strategies::{SeriesBundle, Strategy, StrategyProfile, Trend};
