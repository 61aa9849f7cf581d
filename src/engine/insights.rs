//! Rule-based commentary on a metrics snapshot: plain-text observations
//! the presentation layer can show alongside the numbers.

use rust_decimal::Decimal;

use crate::engine::metrics::{MetricsSnapshot, ProfitFactor};
use crate::types::{Price, Symbol};

/// Generate observations for a snapshot. Pure string production; an
/// empty journal yields a single starter hint.
pub fn generate(snapshot: &MetricsSnapshot) -> Vec<String> {
    if snapshot.total_trades == 0 {
        return vec!["No trades found. Start by adding your first trade!".to_string()];
    }
    let mut insights = Vec::new();

    if snapshot.realized_trades > 0 {
        let win_rate = snapshot.win_rate;
        if win_rate >= Decimal::from(60) {
            insights.push(format!(
                "Excellent win rate of {:.1}%. You're making good trading decisions.",
                win_rate
            ));
        } else if win_rate >= Decimal::from(50) {
            insights.push(format!(
                "Good win rate of {:.1}%. Consider improving your entry/exit timing.",
                win_rate
            ));
        } else {
            insights.push(format!(
                "Win rate of {:.1}% needs improvement. Review your trading strategy.",
                win_rate
            ));
        }

        match snapshot.profit_factor {
            ProfitFactor::Unbounded => {
                insights.push("No losing trades recorded yet.".to_string());
            }
            ProfitFactor::Ratio(ratio) if ratio >= Decimal::from(2) => {
                insights.push(format!(
                    "Strong profit factor of {:.2}. Your winners are significantly larger than losers.",
                    ratio
                ));
            }
            ProfitFactor::Ratio(ratio) if ratio >= Decimal::new(15, 1) => {
                insights.push(format!("Good profit factor of {:.2}. Keep it up.", ratio));
            }
            ProfitFactor::Ratio(ratio) => {
                insights.push(format!(
                    "Profit factor of {:.2} suggests your losses are too large relative to wins.",
                    ratio
                ));
            }
        }
    }

    // Drawdown severity relative to traded volume
    if !snapshot.total_volume.is_zero() {
        let drawdown_share = snapshot.max_drawdown.abs().value() / snapshot.total_volume.value();
        if drawdown_share > Decimal::new(1, 1) {
            insights.push(format!(
                "Maximum drawdown of {} is concerning. Consider reducing position sizes.",
                snapshot.max_drawdown
            ));
        } else if drawdown_share > Decimal::new(5, 2) {
            insights.push(format!(
                "Maximum drawdown of {} is manageable but monitor closely.",
                snapshot.max_drawdown
            ));
        } else {
            insights.push(format!(
                "Low maximum drawdown of {}. Good risk management.",
                snapshot.max_drawdown
            ));
        }
    }

    if let Some((instrument, pnl)) = best_instrument(snapshot) {
        if pnl > Price::ZERO {
            insights.push(format!(
                "{} is your best performer with {} profit.",
                instrument, pnl
            ));
        }
    }
    if let Some((instrument, pnl)) = worst_instrument(snapshot) {
        if pnl < Price::ZERO {
            insights.push(format!(
                "{} is your worst performer with {} loss.",
                instrument,
                pnl.abs()
            ));
        }
    }

    insights
}

fn best_instrument(snapshot: &MetricsSnapshot) -> Option<(&Symbol, Price)> {
    snapshot
        .instrument_pnl
        .iter()
        .max_by_key(|(_, pnl)| **pnl)
        .map(|(symbol, pnl)| (symbol, *pnl))
}

fn worst_instrument(snapshot: &MetricsSnapshot) -> Option<(&Symbol, Price)> {
    snapshot
        .instrument_pnl
        .iter()
        .min_by_key(|(_, pnl)| **pnl)
        .map(|(symbol, pnl)| (symbol, *pnl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::metrics::compute_metrics;
    use crate::engine::replay::replay;
    use crate::journal::trade::{TradeDraft, TradeSide};
    use crate::types::Size;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[test]
    fn test_empty_journal_starter_hint() {
        let insights = generate(&MetricsSnapshot::empty());
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("first trade"));
    }

    #[test]
    fn test_populated_journal_mentions_performers() {
        let mk = |day: u32, symbol: &str, side, price: &str, qty: &str| {
            TradeDraft::new(
                Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
                symbol,
                side,
                Price::from_str(price).unwrap(),
                Size::from_str(qty).unwrap(),
            )
            .build()
            .unwrap()
        };
        let trades = vec![
            mk(1, "AAPL", TradeSide::Buy, "100", "10"),
            mk(2, "AAPL", TradeSide::Sell, "120", "10"), // +200
            mk(1, "NVDA", TradeSide::Buy, "500", "2"),
            mk(2, "NVDA", TradeSide::Sell, "450", "2"), // -100
        ];
        let snapshot = compute_metrics(&replay(&trades), &HashMap::new());

        let insights = generate(&snapshot);
        assert!(insights.iter().any(|line| line.contains("win rate")
            || line.contains("Win rate")));
        assert!(insights.iter().any(|line| line.contains("AAPL")));
        assert!(insights.iter().any(|line| line.contains("NVDA")));
    }
}
