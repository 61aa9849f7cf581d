//! Fixed-rate currency conversion for mixed-currency journals.
//!
//! Rates are a static table, not a live feed; good enough for reporting
//! a single combined P&L figure across US and HK positions.

use rust_decimal::Decimal;

use crate::types::Price;

const USD_HKD: Decimal = Decimal::from_parts(78, 0, 0, false, 1); // 7.8
const USD_EUR: Decimal = Decimal::from_parts(85, 0, 0, false, 2); // 0.85

/// Exchange rate from one 3-letter currency code to another. Identity
/// for same-currency pairs; unknown pairs fall back to 1.
pub fn exchange_rate(from: &str, to: &str) -> Decimal {
    if from.eq_ignore_ascii_case(to) {
        return Decimal::ONE;
    }
    match (
        from.to_ascii_uppercase().as_str(),
        to.to_ascii_uppercase().as_str(),
    ) {
        ("USD", "HKD") => USD_HKD,
        ("HKD", "USD") => Decimal::ONE / USD_HKD,
        ("USD", "EUR") => USD_EUR,
        ("EUR", "USD") => Decimal::ONE / USD_EUR,
        _ => Decimal::ONE,
    }
}

/// Convert a monetary amount between currencies.
pub fn convert(amount: Price, from: &str, to: &str) -> Price {
    amount * exchange_rate(from, to)
}
