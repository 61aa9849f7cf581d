//! Position-sizing guidance: fixed-fractional risk plus a capped Kelly
//! fraction.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::engine::metrics::MetricsSnapshot;
use crate::types::Price;

/// Kelly fractions above 25% are treated as noise, not signal
const KELLY_CAP: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
/// Default stop distance: 2% of entry price
const DEFAULT_STOP_LOSS_FRACTION: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
const ONE_PERCENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Inputs for a sizing calculation.
#[derive(Debug, Clone)]
pub struct RiskInputs {
    pub account_value: Price,
    /// Intended entry price per unit
    pub price: Price,
    /// Stop distance as a fraction of entry price
    pub stop_loss_fraction: Decimal,
    /// Historical win rate as a fraction in [0, 1]
    pub win_rate: Decimal,
    pub avg_win: Price,
    pub avg_loss: Price,
}

impl RiskInputs {
    /// Sizing inputs with the default 2% stop and no trade history
    /// (Kelly collapses to 0 until wins exist).
    pub fn new(account_value: Price, price: Price) -> Self {
        Self {
            account_value,
            price,
            stop_loss_fraction: DEFAULT_STOP_LOSS_FRACTION,
            win_rate: Decimal::ZERO,
            avg_win: Price::ZERO,
            avg_loss: Price::ZERO,
        }
    }

    /// Pull win/loss statistics from a computed snapshot. Snapshot win
    /// rate is a percentage; Kelly wants a fraction.
    pub fn from_snapshot(account_value: Price, price: Price, snapshot: &MetricsSnapshot) -> Self {
        Self {
            win_rate: snapshot.win_rate / Decimal::from(100),
            avg_win: snapshot.avg_win,
            avg_loss: snapshot.avg_loss,
            ..Self::new(account_value, price)
        }
    }
}

/// Sizing guidance derived from [`RiskInputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskGuidance {
    /// 1% of account value: the capital at risk per trade
    pub one_percent_risk: Price,
    /// Loss per unit if the stop is hit
    pub risk_per_unit: Price,
    /// Units purchasable without risking more than 1% of the account
    pub max_units_at_risk: u64,
    /// Kelly fraction clamped to [0, 0.25]
    pub kelly_fraction: Decimal,
    /// min(risk-capped units, Kelly-capped units)
    pub recommended_position_size: u64,
}

/// Compute sizing guidance. Degenerate inputs (zero price, no wins,
/// zero stop distance) resolve to zero-sized guidance, never an error.
pub fn position_size(inputs: &RiskInputs) -> RiskGuidance {
    let one_percent_risk = inputs.account_value * ONE_PERCENT;
    let risk_per_unit = inputs.price * inputs.stop_loss_fraction;

    let max_units_at_risk = if risk_per_unit > Price::ZERO {
        floor_units(one_percent_risk.value() / risk_per_unit.value())
    } else {
        0
    };

    let kelly_fraction = if inputs.avg_win.is_zero() {
        Decimal::ZERO
    } else {
        let edge = inputs.win_rate * inputs.avg_win.value()
            - (Decimal::ONE - inputs.win_rate) * inputs.avg_loss.value().abs();
        (edge / inputs.avg_win.value())
            .max(Decimal::ZERO)
            .min(KELLY_CAP)
    };

    let kelly_units = if inputs.price > Price::ZERO {
        floor_units(inputs.account_value.value() * kelly_fraction / inputs.price.value())
    } else {
        0
    };

    RiskGuidance {
        one_percent_risk,
        risk_per_unit,
        max_units_at_risk,
        kelly_fraction,
        recommended_position_size: max_units_at_risk.min(kelly_units),
    }
}

fn floor_units(value: Decimal) -> u64 {
    value.floor().to_u64().unwrap_or(0)
}
