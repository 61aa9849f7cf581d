pub mod engine;
pub mod error;
pub mod fx;
pub mod journal;
pub mod logging;
pub mod session;
pub mod types;

pub use engine::{
    compute_metrics, position_size, replay, unrealized_pnl, value_open_positions, MetricsSnapshot,
    PositionCursor, PriceSource, ProfitFactor, ReplayReport, RiskGuidance, RiskInputs,
    StaticPrices,
};
pub use error::JournalError;
pub use journal::{
    AssetClass, ImportSummary, OptionDetails, OptionType, Trade, TradeDraft, TradeFilter,
    TradeLedger, TradePatch, TradeSide,
};
pub use session::JournalSession;
pub use types::{Price, Size, Symbol};
