//! Cost-basis replay: turns an unordered trade collection into per-trade
//! realized P&L using average-cost accounting, one instrument at a time.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;
use uuid::Uuid;

use crate::journal::trade::{Trade, TradeSide};
use crate::types::{Price, Size, Symbol};

/// Running position state for one instrument during a replay.
///
/// Created empty when the instrument's first trade is seen, mutated
/// trade by trade, and discarded with the report. Never persisted:
/// every replay rebuilds cursors from scratch. Holding the cumulative
/// realized total here, rather than on the trade rows themselves, is
/// what keeps aggregate consumers from double-counting row snapshots.
#[derive(Debug, Clone)]
pub struct PositionCursor {
    pub instrument: Symbol,
    /// Signed open quantity; positive = long
    pub open_quantity: Size,
    /// Total cost (fees included) attributed to the open quantity
    pub open_cost_basis: Price,
    /// Realized P&L accumulated for this instrument so far
    pub cumulative_realized: Price,
}

impl PositionCursor {
    fn new(instrument: Symbol) -> Self {
        Self {
            instrument,
            open_quantity: Size::ZERO,
            open_cost_basis: Price::ZERO,
            cumulative_realized: Price::ZERO,
        }
    }

    /// Volume-weighted average cost of the open position, None when
    /// there is nothing held long.
    pub fn average_cost(&self) -> Option<Price> {
        if self.open_quantity.is_positive() {
            Some(self.open_cost_basis / self.open_quantity.value())
        } else {
            None
        }
    }

    /// Apply one trade and return its realized P&L contribution.
    fn apply(&mut self, trade: &Trade) -> Price {
        match trade.side() {
            TradeSide::Buy => {
                // A buy never itself realizes P&L: it establishes or
                // adds to the position at full gross cost.
                self.open_quantity = self.open_quantity + trade.quantity();
                self.open_cost_basis += trade.gross_cost();
                Price::ZERO
            }
            TradeSide::Sell => {
                if !self.open_quantity.is_positive() {
                    // Nothing held long: short selling is unsupported,
                    // so the sell contributes nothing and the position
                    // is left unchanged.
                    return Price::ZERO;
                }
                let avg_cost = self.open_cost_basis / self.open_quantity.value();
                let contribution =
                    (trade.unit_price() - avg_cost) * trade.quantity() - trade.fees();
                self.cumulative_realized += contribution;

                let sold = trade.quantity();
                let remaining = self.open_quantity - sold;
                if remaining.is_positive() {
                    // Shrink the basis by the surviving fraction of the
                    // position.
                    let fraction = remaining / (remaining + sold);
                    self.open_cost_basis = self.open_cost_basis * fraction;
                } else {
                    self.open_cost_basis = Price::ZERO;
                }
                self.open_quantity = remaining;
                contribution
            }
        }
    }
}

/// One replayed trade row.
#[derive(Debug, Clone)]
pub struct ReplayRow {
    pub trade_id: Uuid,
    pub instrument: Symbol,
    pub timestamp: DateTime<Utc>,
    pub gross_cost: Price,
    /// Realized P&L produced by this trade alone (0 for buys and
    /// unmatched sells)
    pub contribution: Price,
    /// Cumulative realized P&L for this trade's instrument up to and
    /// including this trade
    pub realized_pnl: Price,
}

/// Output of a full replay pass: rows in global chronological order plus
/// the final position cursor per instrument.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    rows: Vec<ReplayRow>,
    cursors: HashMap<Symbol, PositionCursor>,
}

impl ReplayReport {
    pub fn rows(&self) -> &[ReplayRow] {
        &self.rows
    }

    pub fn cursors(&self) -> &HashMap<Symbol, PositionCursor> {
        &self.cursors
    }

    pub fn cursor(&self, instrument: &Symbol) -> Option<&PositionCursor> {
        self.cursors.get(instrument)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total realized P&L: the sum of each instrument's final
    /// cumulative value. Summing the row snapshots instead would count
    /// every earlier close-out once per subsequent row.
    pub fn total_realized(&self) -> Price {
        self.cursors
            .values()
            .fold(Price::ZERO, |total, cursor| total + cursor.cumulative_realized)
    }
}

/// Replay `trades` through per-instrument average-cost state machines.
///
/// Pure function of its input: the same trade set always produces the
/// same report, instruments never interact, and the relative order of
/// trades belonging to different instruments is irrelevant. Within an
/// instrument, trades replay by timestamp ascending with ties kept in
/// input order.
pub fn replay(trades: &[Trade]) -> ReplayReport {
    let mut order: Vec<usize> = (0..trades.len()).collect();
    // Stable sort: equal timestamps keep input order.
    order.sort_by_key(|&i| trades[i].timestamp());

    let mut report = ReplayReport::default();
    for index in order {
        let trade = &trades[index];
        let cursor = report
            .cursors
            .entry(trade.instrument().clone())
            .or_insert_with(|| PositionCursor::new(trade.instrument().clone()));
        let contribution = cursor.apply(trade);
        report.rows.push(ReplayRow {
            trade_id: trade.id(),
            instrument: trade.instrument().clone(),
            timestamp: trade.timestamp(),
            gross_cost: trade.gross_cost(),
            contribution,
            realized_pnl: cursor.cumulative_realized,
        });
    }
    debug!(
        "replayed {} trades across {} instruments",
        report.rows.len(),
        report.cursors.len()
    );
    report
}
