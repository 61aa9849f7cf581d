use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::JournalError;
use crate::types::{Price, Size, Symbol};

/// Asset class of the traded instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetClass {
    Stock,
    Option,
    Crypto,
    Forex,
    Etf,
    Bond,
}

/// Trade side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stock => "Stock",
            Self::Option => "Option",
            Self::Crypto => "Crypto",
            Self::Forex => "Forex",
            Self::Etf => "ETF",
            Self::Bond => "Bond",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for TradeSide {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(JournalError::validation(
                "side",
                format!("unknown trade side '{}'", other),
            )),
        }
    }
}

impl std::str::FromStr for AssetClass {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "option" => Ok(Self::Option),
            "crypto" => Ok(Self::Crypto),
            "forex" => Ok(Self::Forex),
            "etf" => Ok(Self::Etf),
            "bond" => Ok(Self::Bond),
            other => Err(JournalError::validation(
                "asset_class",
                format!("unknown asset class '{}'", other),
            )),
        }
    }
}

/// Option contract right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// Option-specific contract terms, present exactly when the trade's
/// asset class is [`AssetClass::Option`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDetails {
    pub option_type: OptionType,
    pub strike_price: Price,
    pub expiration_date: DateTime<Utc>,
    /// Premium paid/received per contract
    pub premium: Option<Price>,
    /// Strategy label, e.g. "Long Call"
    pub strategy: String,
}

/// One executed transaction, immutable once priced.
///
/// `gross_cost` is derived from price, quantity and fees and recomputed
/// whenever any of them changes; it is never independently mutated.
/// `realized_pnl` and `unrealized_pnl` are write-only outputs of the
/// P&L engine: the stored values are a recomputable cache, never a
/// source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    id: Uuid,
    timestamp: DateTime<Utc>,
    instrument: Symbol,
    asset_class: AssetClass,
    side: TradeSide,
    unit_price: Price,
    quantity: Size,
    fees: Price,
    notes: String,
    currency: String,
    market: String,
    option: Option<OptionDetails>,
    gross_cost: Price,
    realized_pnl: Price,
    unrealized_pnl: Price,
}

impl Trade {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn instrument(&self) -> &Symbol {
        &self.instrument
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    pub fn quantity(&self) -> Size {
        self.quantity
    }

    pub fn fees(&self) -> Price {
        self.fees
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn option_details(&self) -> Option<&OptionDetails> {
        self.option.as_ref()
    }

    /// Total transaction value: unit_price * quantity + fees
    pub fn gross_cost(&self) -> Price {
        self.gross_cost
    }

    /// Cumulative realized P&L for this trade's instrument as of this
    /// trade, as last written back by the engine. 0 until a replay has
    /// been persisted.
    pub fn realized_pnl(&self) -> Price {
        self.realized_pnl
    }

    /// Paper P&L as of the last open-position valuation pass. 0 until
    /// one has run.
    pub fn unrealized_pnl(&self) -> Price {
        self.unrealized_pnl
    }

    pub(crate) fn set_realized_pnl(&mut self, value: Price) {
        self.realized_pnl = value;
    }

    pub(crate) fn set_unrealized_pnl(&mut self, value: Price) {
        self.unrealized_pnl = value;
    }

    pub(crate) fn apply_patch(&mut self, patch: TradePatch) -> Result<(), JournalError> {
        // Validate the candidate values before touching the record so a
        // rejected patch leaves the trade unchanged.
        let unit_price = patch.unit_price.unwrap_or(self.unit_price);
        let quantity = patch.quantity.unwrap_or(self.quantity);
        let fees = patch.fees.unwrap_or(self.fees);
        validate_amounts(unit_price, quantity, fees)?;

        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.unit_price = unit_price;
        self.quantity = quantity;
        self.fees = fees;
        self.gross_cost = self.unit_price * self.quantity + self.fees;
        Ok(())
    }
}

/// Partial update for an existing trade. Only the priced fields and
/// notes are patchable; identity fields (instrument, side, class) are
/// fixed once the trade exists.
#[derive(Debug, Clone, Default)]
pub struct TradePatch {
    pub timestamp: Option<DateTime<Utc>>,
    pub unit_price: Option<Price>,
    pub quantity: Option<Size>,
    pub fees: Option<Price>,
    pub notes: Option<String>,
}

/// Unvalidated trade input, as received from a form or an import row.
/// [`TradeDraft::build`] is the single validation gate: no trade reaches
/// the ledger or the engine without passing it.
#[derive(Debug, Clone)]
pub struct TradeDraft {
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub asset_class: AssetClass,
    pub side: TradeSide,
    pub unit_price: Price,
    pub quantity: Size,
    pub fees: Price,
    pub notes: String,
    /// ISO-like 3-letter code; derived from the instrument suffix when None
    pub currency: Option<String>,
    pub option: Option<OptionDetails>,
}

impl TradeDraft {
    /// Minimal draft for a stock trade; fees default to zero.
    pub fn new(
        timestamp: DateTime<Utc>,
        instrument: impl Into<String>,
        side: TradeSide,
        unit_price: Price,
        quantity: Size,
    ) -> Self {
        Self {
            timestamp,
            instrument: instrument.into(),
            asset_class: AssetClass::Stock,
            side,
            unit_price,
            quantity,
            fees: Price::ZERO,
            notes: String::new(),
            currency: None,
            option: None,
        }
    }

    /// Validate and produce an immutable [`Trade`] with derived fields
    /// populated. The assigned id is unique and never changes.
    pub fn build(self) -> Result<Trade, JournalError> {
        let instrument = Symbol::new(self.instrument);
        if instrument.is_empty() {
            return Err(JournalError::validation(
                "instrument",
                "instrument symbol is required",
            ));
        }
        validate_amounts(self.unit_price, self.quantity, self.fees)?;
        match (self.asset_class, &self.option) {
            (AssetClass::Option, None) => {
                return Err(JournalError::validation(
                    "option",
                    "option trades require option details",
                ));
            }
            (AssetClass::Option, Some(details)) if details.strike_price < Price::ZERO => {
                return Err(JournalError::validation(
                    "strike_price",
                    "strike price must not be negative",
                ));
            }
            (class, Some(_)) if class != AssetClass::Option => {
                return Err(JournalError::validation(
                    "option",
                    "option details are only valid for option trades",
                ));
            }
            _ => {}
        }

        let currency = self
            .currency
            .unwrap_or_else(|| instrument.default_currency().to_string());
        let market = instrument.market().to_string();
        let gross_cost = self.unit_price * self.quantity + self.fees;

        Ok(Trade {
            id: Uuid::new_v4(),
            timestamp: self.timestamp,
            instrument,
            asset_class: self.asset_class,
            side: self.side,
            unit_price: self.unit_price,
            quantity: self.quantity,
            fees: self.fees,
            notes: self.notes,
            currency,
            market,
            option: self.option,
            gross_cost,
            realized_pnl: Price::ZERO,
            unrealized_pnl: Price::ZERO,
        })
    }
}

fn validate_amounts(unit_price: Price, quantity: Size, fees: Price) -> Result<(), JournalError> {
    if unit_price < Price::ZERO {
        return Err(JournalError::validation(
            "unit_price",
            "price must not be negative",
        ));
    }
    if !quantity.is_positive() {
        return Err(JournalError::validation(
            "quantity",
            "quantity must be greater than zero",
        ));
    }
    if fees < Price::ZERO {
        return Err(JournalError::validation(
            "fees",
            "fees must not be negative",
        ));
    }
    Ok(())
}
