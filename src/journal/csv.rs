//! CSV export and bulk import for the trade ledger.
//!
//! The row format is a fixed header plus one line per trade:
//! `timestamp,instrument,asset_class,side,unit_price,quantity,fees,notes`
//! with RFC 3339 timestamps. Notes is the last column and may contain
//! commas. Import is partial-success: malformed rows are skipped and
//! counted, never aborting the batch.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::warn;

use crate::error::JournalError;
use crate::journal::ledger::TradeLedger;
use crate::journal::trade::{AssetClass, TradeDraft, TradeSide};
use crate::types::{Price, Size};

const HEADER: &str = "timestamp,instrument,asset_class,side,unit_price,quantity,fees,notes";

/// Outcome of a bulk import: how many rows became trades and how many
/// were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Write every ledger trade to `path` in timestamp order.
pub fn export_trades(ledger: &TradeLedger, path: &Path) -> Result<(), JournalError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", HEADER)?;
    for trade in ledger.list(None) {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            trade.timestamp().to_rfc3339(),
            trade.instrument(),
            trade.asset_class(),
            trade.side(),
            trade.unit_price(),
            trade.quantity(),
            trade.fees(),
            trade.notes(),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Import rows from `path` into the ledger.
///
/// Rows that fail to parse or fail trade validation are counted as
/// failures and skipped; every well-formed row lands in the ledger. The
/// outer `Result` only reports failure to read the file itself.
pub fn import_trades(ledger: &mut TradeLedger, path: &Path) -> Result<ImportSummary, JournalError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut summary = ImportSummary {
        succeeded: 0,
        failed: 0,
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || (number == 0 && trimmed.eq_ignore_ascii_case(HEADER)) {
            continue;
        }
        match parse_row(trimmed).and_then(|draft| ledger.add(draft)) {
            Ok(_) => summary.succeeded += 1,
            Err(err) => {
                warn!("skipping import row {}: {}", number + 1, err);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn parse_row(line: &str) -> Result<TradeDraft, JournalError> {
    // Notes is last and may contain commas, so cap the split at 8 parts.
    let fields: Vec<&str> = line.splitn(8, ',').collect();
    if fields.len() < 6 {
        return Err(JournalError::validation(
            "row",
            format!("expected at least 6 columns, got {}", fields.len()),
        ));
    }

    let timestamp = DateTime::parse_from_rfc3339(fields[0].trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| JournalError::validation("timestamp", err.to_string()))?;
    let asset_class = AssetClass::from_str(fields[2])?;
    let side = TradeSide::from_str(fields[3])?;
    let unit_price = Price::from_str(fields[4].trim())
        .map_err(|err| JournalError::validation("unit_price", err.to_string()))?;
    let quantity = Size::from_str(fields[5].trim())
        .map_err(|err| JournalError::validation("quantity", err.to_string()))?;
    let fees = match fields.get(6) {
        Some(raw) if !raw.trim().is_empty() => Price::from_str(raw.trim())
            .map_err(|err| JournalError::validation("fees", err.to_string()))?,
        _ => Price::ZERO,
    };

    let mut draft = TradeDraft::new(timestamp, fields[1].trim(), side, unit_price, quantity);
    draft.asset_class = asset_class;
    draft.fees = fees;
    draft.notes = fields.get(7).map(|s| s.trim().to_string()).unwrap_or_default();
    Ok(draft)
}
