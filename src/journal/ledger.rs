use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use uuid::Uuid;

use crate::engine::ReplayReport;
use crate::error::JournalError;
use crate::journal::trade::{AssetClass, Trade, TradeDraft, TradePatch};
use crate::types::{Price, Symbol};

/// Criteria for a filtered listing. All fields are optional and combine
/// with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub instrument: Option<Symbol>,
    pub asset_class: Option<AssetClass>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TradeFilter {
    pub fn for_instrument(symbol: impl Into<Symbol>) -> Self {
        Self {
            instrument: Some(symbol.into()),
            ..Self::default()
        }
    }

    fn matches(&self, trade: &Trade) -> bool {
        if let Some(instrument) = &self.instrument {
            if trade.instrument() != instrument {
                return false;
            }
        }
        if let Some(class) = self.asset_class {
            if trade.asset_class() != class {
                return false;
            }
        }
        if let Some(from) = self.from {
            if trade.timestamp() < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if trade.timestamp() > to {
                return false;
            }
        }
        true
    }
}

/// Single-writer trade store, one ledger = one JSON file per user.
///
/// Owns its [`Trade`] records exclusively: every mutation goes through
/// `add`/`update`/`delete`, and persistence is write-to-temp-then-rename
/// so a storage failure leaves both the file and the in-memory state
/// untouched.
pub struct TradeLedger {
    path: Option<PathBuf>,
    trades: Vec<Trade>,
}

impl TradeLedger {
    /// Ledger with no backing file. Used by tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            trades: Vec::new(),
        }
    }

    /// Open (or create) a file-backed ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        let trades = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        info!(
            "opened ledger {} with {} trades",
            path.display(),
            trades.len()
        );
        Ok(Self {
            path: Some(path),
            trades,
        })
    }

    /// Validate a draft and append the resulting trade.
    pub fn add(&mut self, draft: TradeDraft) -> Result<Uuid, JournalError> {
        let trade = draft.build()?;
        let id = trade.id();
        self.trades.push(trade);
        if let Err(err) = self.save() {
            self.trades.pop();
            return Err(err);
        }
        debug!("added trade {}", id);
        Ok(id)
    }

    /// All trades matching `filter`, ordered by timestamp ascending with
    /// ties kept in insertion order.
    pub fn list(&self, filter: Option<&TradeFilter>) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|trade| filter.map_or(true, |f| f.matches(trade)))
            .cloned()
            .collect();
        // sort_by_key is stable, so equal timestamps keep insertion order
        trades.sort_by_key(|trade| trade.timestamp());
        trades
    }

    pub fn get(&self, id: Uuid) -> Option<&Trade> {
        self.trades.iter().find(|trade| trade.id() == id)
    }

    /// Patch an existing trade; gross_cost is recomputed from the
    /// patched price/quantity/fees.
    pub fn update(&mut self, id: Uuid, patch: TradePatch) -> Result<(), JournalError> {
        let index = self
            .trades
            .iter()
            .position(|trade| trade.id() == id)
            .ok_or(JournalError::TradeNotFound(id))?;

        let mut patched = self.trades[index].clone();
        patched.apply_patch(patch)?;
        let previous = std::mem::replace(&mut self.trades[index], patched);
        if let Err(err) = self.save() {
            self.trades[index] = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), JournalError> {
        let index = self
            .trades
            .iter()
            .position(|trade| trade.id() == id)
            .ok_or(JournalError::TradeNotFound(id))?;

        let removed = self.trades.remove(index);
        if let Err(err) = self.save() {
            self.trades.insert(index, removed);
            return Err(err);
        }
        Ok(())
    }

    /// Remove every trade from the ledger.
    pub fn clear_all(&mut self) -> Result<(), JournalError> {
        let previous = std::mem::take(&mut self.trades);
        if let Err(err) = self.save() {
            self.trades = previous;
            return Err(err);
        }
        info!("ledger cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Persist engine output back onto the trade rows as a recomputable
    /// cache: each row receives the cumulative realized P&L snapshot
    /// computed for it, and the chronologically last row per instrument
    /// carries that instrument's unrealized P&L so the stored column
    /// sums correctly.
    pub fn store_replay_results(
        &mut self,
        report: &ReplayReport,
        unrealized: &HashMap<Symbol, Price>,
    ) -> Result<(), JournalError> {
        let cumulative: HashMap<Uuid, Price> = report
            .rows()
            .iter()
            .map(|row| (row.trade_id, row.realized_pnl))
            .collect();

        let mut last_per_instrument: HashMap<Symbol, Uuid> = HashMap::new();
        for trade in self.list(None) {
            last_per_instrument.insert(trade.instrument().clone(), trade.id());
        }

        let previous = self.trades.clone();
        for trade in &mut self.trades {
            if let Some(value) = cumulative.get(&trade.id()) {
                trade.set_realized_pnl(*value);
            }
            let is_last = last_per_instrument.get(trade.instrument()) == Some(&trade.id());
            let value = if is_last {
                unrealized
                    .get(trade.instrument())
                    .copied()
                    .unwrap_or(Price::ZERO)
            } else {
                Price::ZERO
            };
            trade.set_unrealized_pnl(value);
        }
        if let Err(err) = self.save() {
            self.trades = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Copy the ledger file to `backup_path`.
    pub fn backup(&self, backup_path: &Path) -> Result<(), JournalError> {
        match &self.path {
            Some(path) => {
                fs::copy(path, backup_path)?;
                info!("ledger backed up to {}", backup_path.display());
                Ok(())
            }
            None => Err(JournalError::Storage(
                "in-memory ledger has no file to back up".into(),
            )),
        }
    }

    /// Replace the ledger contents with those of a backup file.
    pub fn restore(&mut self, backup_path: &Path) -> Result<(), JournalError> {
        let raw = fs::read_to_string(backup_path)?;
        let trades: Vec<Trade> = serde_json::from_str(&raw)?;
        let previous = std::mem::replace(&mut self.trades, trades);
        if let Err(err) = self.save() {
            self.trades = previous;
            return Err(err);
        }
        info!("ledger restored from {}", backup_path.display());
        Ok(())
    }

    fn save(&self) -> Result<(), JournalError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(&self.trades)?;
        let tmp = path.with_extension("tmp");
        if let Err(err) = fs::write(&tmp, serialized).and_then(|_| fs::rename(&tmp, path)) {
            error!("failed to persist ledger {}: {}", path.display(), err);
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}
