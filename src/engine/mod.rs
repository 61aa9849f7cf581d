pub mod insights;
pub mod metrics;
pub mod replay;
pub mod risk;
pub mod valuation;

pub use metrics::{compute_metrics, MetricsSnapshot, ProfitFactor};
pub use replay::{replay, PositionCursor, ReplayReport, ReplayRow};
pub use risk::{position_size, RiskGuidance, RiskInputs};
pub use valuation::{unrealized_pnl, value_open_positions, PriceSource, StaticPrices};
