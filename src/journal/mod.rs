pub mod csv;
pub mod ledger;
pub mod trade;

pub use csv::{export_trades, import_trades, ImportSummary};
pub use ledger::{TradeFilter, TradeLedger};
pub use trade::{AssetClass, OptionDetails, OptionType, Trade, TradeDraft, TradePatch, TradeSide};
