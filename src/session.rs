//! Caller-owned journal context.
//!
//! There is no process-wide state anywhere in this crate: the
//! application loop owns a [`JournalSession`] holding the active ledger
//! and the last computed snapshot, and the engine functions stay pure.

use log::info;

use crate::engine::metrics::{compute_metrics, MetricsSnapshot};
use crate::engine::replay::{replay, ReplayReport};
use crate::engine::valuation::{value_open_positions, PriceSource};
use crate::error::JournalError;
use crate::journal::ledger::TradeLedger;

/// Active ledger plus the most recent engine output.
///
/// `refresh` is the one recomputation path: list the ledger, replay it,
/// value open positions if a price source is available, compute metrics,
/// and persist the derived P&L columns back as a cache. Snapshots are
/// never reused across ledger mutations; callers refresh after writing.
pub struct JournalSession {
    ledger: TradeLedger,
    last_report: Option<ReplayReport>,
    last_snapshot: Option<MetricsSnapshot>,
}

impl JournalSession {
    pub fn new(ledger: TradeLedger) -> Self {
        Self {
            ledger,
            last_report: None,
            last_snapshot: None,
        }
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TradeLedger {
        &mut self.ledger
    }

    /// Snapshot from the last `refresh`, if one has run.
    pub fn last_snapshot(&self) -> Option<&MetricsSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Replay report from the last `refresh`, if one has run.
    pub fn last_report(&self) -> Option<&ReplayReport> {
        self.last_report.as_ref()
    }

    /// Recompute everything from the current ledger contents.
    ///
    /// Passing a [`PriceSource`] adds unrealized P&L for open positions;
    /// without one, only realized figures are produced. The derived
    /// per-trade P&L values are written back to the ledger as a
    /// recomputable cache.
    pub fn refresh(
        &mut self,
        prices: Option<&dyn PriceSource>,
    ) -> Result<&MetricsSnapshot, JournalError> {
        let trades = self.ledger.list(None);
        let report = replay(&trades);
        let unrealized = match prices {
            Some(source) => value_open_positions(&report, source),
            None => Default::default(),
        };
        self.ledger.store_replay_results(&report, &unrealized)?;

        let snapshot = compute_metrics(&report, &unrealized);
        info!(
            "refreshed session: {} trades, total P&L {}",
            snapshot.total_trades, snapshot.total_pnl
        );
        self.last_report = Some(report);
        Ok(self.last_snapshot.insert(snapshot))
    }
}
