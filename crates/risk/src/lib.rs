pub mod correlation;
pub mod manager;
pub mod sizing;

pub use correlation::{default_correlation_groups, CorrelationGroup};
pub use manager::{RiskConfig, RiskManager, Selection};
pub use sizing::{confidence_multiplier, estimated_win_rate, MAX_LOT_SIZE};
