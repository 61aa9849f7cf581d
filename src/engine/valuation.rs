//! Open-position valuation against current market prices.
//!
//! Price lookup is an external collaborator behind [`PriceSource`]; the
//! engine never performs network I/O. A missing quote simply leaves the
//! instrument unvalued.

use std::collections::HashMap;

use crate::engine::replay::ReplayReport;
use crate::types::{Price, Size, Symbol};

/// Collaborator that can quote a current market price for an instrument.
pub trait PriceSource {
    fn current_price(&self, instrument: &Symbol) -> Option<Price>;
}

/// Fixed price table, usable as a stub source or for what-if valuation.
#[derive(Debug, Clone, Default)]
pub struct StaticPrices(HashMap<Symbol, Price>);

impl StaticPrices {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with_price(mut self, instrument: impl Into<Symbol>, price: Price) -> Self {
        self.0.insert(instrument.into(), price);
        self
    }
}

impl PriceSource for StaticPrices {
    fn current_price(&self, instrument: &Symbol) -> Option<Price> {
        self.0.get(instrument).copied()
    }
}

/// Paper P&L of an open long position valued at `current_price`.
/// Positions that are flat or net short carry no unrealized P&L here
/// (short accounting is unsupported).
pub fn unrealized_pnl(open_quantity: Size, avg_cost: Price, current_price: Price) -> Price {
    if open_quantity.is_positive() {
        (current_price - avg_cost) * open_quantity
    } else {
        Price::ZERO
    }
}

/// Value every open position in the report against `source`, returning
/// unrealized P&L per instrument. Instruments without a quote or
/// without an open long position are omitted.
pub fn value_open_positions(
    report: &ReplayReport,
    source: &dyn PriceSource,
) -> HashMap<Symbol, Price> {
    let mut valued = HashMap::new();
    for (instrument, cursor) in report.cursors() {
        let Some(avg_cost) = cursor.average_cost() else {
            continue;
        };
        let Some(current) = source.current_price(instrument) else {
            continue;
        };
        valued.insert(
            instrument.clone(),
            unrealized_pnl(cursor.open_quantity, avg_cost, current),
        );
    }
    valued
}
