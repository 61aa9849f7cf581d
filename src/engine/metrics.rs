//! Aggregate performance metrics over a replayed trade set.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::engine::replay::ReplayReport;
use crate::types::{Price, Symbol};

/// Annualization constant for daily-like return periods
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Ratio of total winning P&L to total losing P&L. A trade history with
/// winners and no losers has no finite ratio, so the sentinel is
/// explicit rather than a magic maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitFactor {
    Ratio(Decimal),
    Unbounded,
}

impl ProfitFactor {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            Self::Ratio(value) => Some(*value),
            Self::Unbounded => None,
        }
    }
}

impl std::fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ratio(value) => write!(f, "{}", value),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Pure-function result over one replayed trade set. Immutable,
/// recomputed on demand, never cached across ledger mutations.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_trades: usize,
    /// Rows that realized P&L (nonzero contribution)
    pub realized_trades: usize,
    /// Final cumulative realized P&L across instruments plus unrealized
    pub total_pnl: Price,
    /// Percentage of realized rows that were winners
    pub win_rate: Decimal,
    pub avg_win: Price,
    pub avg_loss: Price,
    pub profit_factor: ProfitFactor,
    /// Most negative excursion of cumulative realized P&L from its
    /// running peak (<= 0)
    pub max_drawdown: Price,
    /// Annualized mean-over-stdev of period returns on the cumulative
    /// realized series
    pub sharpe_ratio: Decimal,
    pub largest_win: Price,
    pub largest_loss: Price,
    pub best_month: Price,
    pub worst_month: Price,
    /// Realized P&L grouped by (year, month)
    pub monthly_pnl: BTreeMap<(i32, u32), Price>,
    /// Final cumulative realized P&L per instrument
    pub instrument_pnl: HashMap<Symbol, Price>,
    pub total_volume: Price,
    pub avg_trade_size: Price,
}

impl MetricsSnapshot {
    /// Neutral snapshot for an empty trade set.
    pub fn empty() -> Self {
        Self {
            total_trades: 0,
            realized_trades: 0,
            total_pnl: Price::ZERO,
            win_rate: Decimal::ZERO,
            avg_win: Price::ZERO,
            avg_loss: Price::ZERO,
            profit_factor: ProfitFactor::Ratio(Decimal::ZERO),
            max_drawdown: Price::ZERO,
            sharpe_ratio: Decimal::ZERO,
            largest_win: Price::ZERO,
            largest_loss: Price::ZERO,
            best_month: Price::ZERO,
            worst_month: Price::ZERO,
            monthly_pnl: BTreeMap::new(),
            instrument_pnl: HashMap::new(),
            total_volume: Price::ZERO,
            avg_trade_size: Price::ZERO,
        }
    }
}

/// Compute a [`MetricsSnapshot`] from a replay report and the current
/// per-instrument unrealized P&L. Pure: no side effects, no I/O, and
/// every degenerate input resolves to a neutral value instead of an
/// error.
pub fn compute_metrics(
    report: &ReplayReport,
    unrealized: &HashMap<Symbol, Price>,
) -> MetricsSnapshot {
    if report.is_empty() {
        return MetricsSnapshot::empty();
    }
    let rows = report.rows();
    let mut snapshot = MetricsSnapshot::empty();
    snapshot.total_trades = rows.len();

    // Total P&L must come from each instrument's final cumulative value;
    // summing the per-row snapshots would count earlier close-outs once
    // per later row.
    let total_unrealized = unrealized
        .values()
        .fold(Price::ZERO, |total, value| total + *value);
    snapshot.total_pnl = report.total_realized() + total_unrealized;

    for (instrument, cursor) in report.cursors() {
        snapshot
            .instrument_pnl
            .insert(instrument.clone(), cursor.cumulative_realized);
    }

    // Win/loss classification over rows that realized P&L
    let mut winners = 0usize;
    let mut losers = 0usize;
    let mut winning_sum = Price::ZERO;
    let mut losing_sum = Price::ZERO;
    for row in rows {
        if row.contribution > Price::ZERO {
            winners += 1;
            winning_sum += row.contribution;
        } else if row.contribution < Price::ZERO {
            losers += 1;
            losing_sum += row.contribution;
        }
        snapshot.largest_win = snapshot.largest_win.max(row.contribution);
        snapshot.largest_loss = snapshot.largest_loss.min(row.contribution);
        snapshot.total_volume += row.gross_cost;

        let key = (row.timestamp.year(), row.timestamp.month());
        let entry = snapshot.monthly_pnl.entry(key).or_insert(Price::ZERO);
        *entry += row.contribution;
    }
    snapshot.realized_trades = winners + losers;

    if snapshot.realized_trades > 0 {
        snapshot.win_rate = Decimal::from(winners) / Decimal::from(snapshot.realized_trades)
            * Decimal::from(100);
        if winners > 0 {
            snapshot.avg_win = winning_sum / Decimal::from(winners);
        }
        if losers > 0 {
            snapshot.avg_loss = losing_sum / Decimal::from(losers);
        }
        snapshot.profit_factor = if losing_sum.is_zero() {
            if winning_sum > Price::ZERO {
                ProfitFactor::Unbounded
            } else {
                ProfitFactor::Ratio(Decimal::ZERO)
            }
        } else {
            ProfitFactor::Ratio((winning_sum.value() / losing_sum.value()).abs())
        };
    }

    snapshot.avg_trade_size = snapshot.total_volume / Decimal::from(rows.len());

    // Drawdown over the cumulative realized series, all instruments
    // combined, in chronological order
    let mut cumulative = Price::ZERO;
    let mut peak = Price::ZERO;
    let mut max_drawdown = Price::ZERO;
    let mut realized_series = Vec::new();
    for row in rows {
        cumulative += row.contribution;
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.min(cumulative - peak);
        if !row.contribution.is_zero() {
            realized_series.push(cumulative.value());
        }
    }
    snapshot.max_drawdown = max_drawdown;
    snapshot.sharpe_ratio = sharpe_ratio(&realized_series);

    if let Some(best) = snapshot.monthly_pnl.values().max() {
        snapshot.best_month = *best;
    }
    if let Some(worst) = snapshot.monthly_pnl.values().min() {
        snapshot.worst_month = *worst;
    }

    snapshot
}

/// Annualized Sharpe-like ratio over the cumulative realized series at
/// its realized points: mean over standard deviation of
/// period-over-period percentage changes, scaled by sqrt(252). Returns 0
/// whenever the series is too short or degenerate.
fn sharpe_ratio(series: &[Decimal]) -> Decimal {
    if series.len() < 2 {
        return Decimal::ZERO;
    }
    let mut changes: Vec<f64> = Vec::with_capacity(series.len() - 1);
    for pair in series.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        // A zero base has no defined percentage change; drop the point
        // the way the source series drops leading undefined values.
        if prev.is_zero() {
            continue;
        }
        let change = (current - prev) / prev;
        if let Some(value) = change.to_f64() {
            changes.push(value);
        }
    }
    if changes.len() < 2 {
        return Decimal::ZERO;
    }

    let n = changes.len() as f64;
    let mean = changes.iter().sum::<f64>() / n;
    // Sample variance (n - 1), matching the source statistics
    let variance = changes
        .iter()
        .map(|change| (change - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let stdev = variance.sqrt();
    if stdev == 0.0 || !stdev.is_finite() {
        return Decimal::ZERO;
    }
    let ratio = mean / stdev * TRADING_DAYS_PER_YEAR.sqrt();
    Decimal::from_f64_retain(ratio).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::replay::replay;
    use crate::journal::trade::{Trade, TradeDraft, TradeSide};
    use crate::types::Size;
    use chrono::{TimeZone, Utc};

    fn trade(
        month: u32,
        day: u32,
        symbol: &str,
        side: TradeSide,
        price: &str,
        qty: &str,
    ) -> Trade {
        TradeDraft::new(
            Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap(),
            symbol,
            side,
            Price::from_str(price).unwrap(),
            Size::from_str(qty).unwrap(),
        )
        .build()
        .unwrap()
    }

    fn metrics_for(trades: &[Trade]) -> MetricsSnapshot {
        compute_metrics(&replay(trades), &HashMap::new())
    }

    #[test]
    fn test_empty_input_neutral_snapshot() {
        let snapshot = metrics_for(&[]);
        assert_eq!(snapshot.total_trades, 0);
        assert_eq!(snapshot.total_pnl, Price::ZERO);
        assert_eq!(snapshot.win_rate, Decimal::ZERO);
        assert_eq!(snapshot.profit_factor, ProfitFactor::Ratio(Decimal::ZERO));
        assert_eq!(snapshot.max_drawdown, Price::ZERO);
        assert_eq!(snapshot.sharpe_ratio, Decimal::ZERO);
        assert!(snapshot.monthly_pnl.is_empty());
    }

    #[test]
    fn test_all_winning_round_trip() {
        // Scenario: buy 10 @ 100, sell 10 @ 120, no fees.
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"),
            trade(1, 2, "AAPL", TradeSide::Sell, "120", "10"),
        ];
        let snapshot = metrics_for(&trades);

        assert_eq!(snapshot.total_trades, 2);
        assert_eq!(snapshot.realized_trades, 1);
        assert_eq!(snapshot.total_pnl, Price::from_str("200").unwrap());
        assert_eq!(snapshot.win_rate, Decimal::from(100));
        assert_eq!(snapshot.avg_win, Price::from_str("200").unwrap());
        assert_eq!(snapshot.avg_loss, Price::ZERO);
        assert!(snapshot.profit_factor.is_unbounded());
        assert_eq!(snapshot.largest_win, Price::from_str("200").unwrap());
    }

    #[test]
    fn test_mixed_wins_and_losses() {
        // Buy 10 @ 100, sell 5 @ 90 (-50), sell 5 @ 110 (+50).
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"),
            trade(1, 2, "AAPL", TradeSide::Sell, "90", "5"),
            trade(1, 3, "AAPL", TradeSide::Sell, "110", "5"),
        ];
        let snapshot = metrics_for(&trades);

        assert_eq!(snapshot.realized_trades, 2);
        // Final cumulative realized is 0, not the -50 + -50+50 row sum
        assert_eq!(snapshot.total_pnl, Price::ZERO);
        assert_eq!(snapshot.win_rate, Decimal::from(50));
        assert_eq!(snapshot.avg_win, Price::from_str("50").unwrap());
        assert_eq!(snapshot.avg_loss, Price::from_str("-50").unwrap());
        assert_eq!(
            snapshot.profit_factor,
            ProfitFactor::Ratio(Decimal::from(1))
        );
        assert_eq!(snapshot.max_drawdown, Price::from_str("-50").unwrap());
        assert_eq!(snapshot.largest_loss, Price::from_str("-50").unwrap());
    }

    #[test]
    fn test_total_pnl_no_double_count_across_instruments() {
        // AAPL realizes +100 over two sells; NVDA realizes +50.
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"),
            trade(1, 2, "AAPL", TradeSide::Sell, "110", "5"),
            trade(1, 3, "AAPL", TradeSide::Sell, "110", "5"),
            trade(1, 1, "NVDA", TradeSide::Buy, "500", "1"),
            trade(1, 4, "NVDA", TradeSide::Sell, "550", "1"),
        ];
        let snapshot = metrics_for(&trades);

        // Row snapshots are 50, 100 for AAPL and 50 for NVDA; a naive
        // row sum would give 200.
        assert_eq!(snapshot.total_pnl, Price::from_str("150").unwrap());
        assert_eq!(
            snapshot.instrument_pnl[&Symbol::new("AAPL")],
            Price::from_str("100").unwrap()
        );
        assert_eq!(
            snapshot.instrument_pnl[&Symbol::new("NVDA")],
            Price::from_str("50").unwrap()
        );
    }

    #[test]
    fn test_unrealized_included_in_total() {
        let trades = vec![trade(1, 1, "AAPL", TradeSide::Buy, "100", "10")];
        let report = replay(&trades);
        let mut unrealized = HashMap::new();
        unrealized.insert(Symbol::new("AAPL"), Price::from_str("75").unwrap());

        let snapshot = compute_metrics(&report, &unrealized);
        assert_eq!(snapshot.total_pnl, Price::from_str("75").unwrap());
        assert_eq!(snapshot.realized_trades, 0);
    }

    #[test]
    fn test_monthly_breakdown() {
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "20"),
            trade(1, 10, "AAPL", TradeSide::Sell, "110", "10"), // Jan: +100
            trade(2, 10, "AAPL", TradeSide::Sell, "90", "10"),  // Feb: -100
        ];
        let snapshot = metrics_for(&trades);

        assert_eq!(
            snapshot.monthly_pnl[&(2024, 1)],
            Price::from_str("100").unwrap()
        );
        assert_eq!(
            snapshot.monthly_pnl[&(2024, 2)],
            Price::from_str("-100").unwrap()
        );
        assert_eq!(snapshot.best_month, Price::from_str("100").unwrap());
        assert_eq!(snapshot.worst_month, Price::from_str("-100").unwrap());
    }

    #[test]
    fn test_volume_stats() {
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"), // 1000
            trade(1, 2, "NVDA", TradeSide::Buy, "500", "1"),  // 500
        ];
        let snapshot = metrics_for(&trades);

        assert_eq!(snapshot.total_volume, Price::from_str("1500").unwrap());
        assert_eq!(snapshot.avg_trade_size, Price::from_str("750").unwrap());
    }

    #[test]
    fn test_sharpe_insufficient_data_is_zero() {
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"),
            trade(1, 2, "AAPL", TradeSide::Sell, "120", "10"),
        ];
        let snapshot = metrics_for(&trades);
        assert_eq!(snapshot.sharpe_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_sharpe_nonzero_with_enough_realized_rows() {
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "40"),
            trade(1, 2, "AAPL", TradeSide::Sell, "110", "10"), // cum 100
            trade(1, 3, "AAPL", TradeSide::Sell, "112", "10"), // cum 220
            trade(1, 4, "AAPL", TradeSide::Sell, "111", "10"), // cum 330
            trade(1, 5, "AAPL", TradeSide::Sell, "113", "10"), // cum 460
        ];
        let snapshot = metrics_for(&trades);
        assert!(snapshot.sharpe_ratio > Decimal::ZERO);
    }

    #[test]
    fn test_drawdown_all_buys_is_zero() {
        let trades = vec![
            trade(1, 1, "AAPL", TradeSide::Buy, "100", "10"),
            trade(1, 2, "AAPL", TradeSide::Buy, "105", "10"),
        ];
        let snapshot = metrics_for(&trades);
        assert_eq!(snapshot.max_drawdown, Price::ZERO);
    }
}
