use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AxisError, AxisResult};

/// Relative distance under which a ratio counts as an exact integer.
const INTEGER_TOLERANCE: f64 = 1e-9;

/// Largest decimal count routed through `Decimal`; beyond it the mantissa
/// cannot hold the digits and plain float scaling is used.
const MAX_DECIMAL_PLACES: u32 = 20;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> AxisResult<f64> {
    value.to_f64().ok_or_else(|| {
        AxisError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// `10^floor(log10(|value|))`.
#[must_use]
pub fn decimal_power(value: f64) -> f64 {
    let exponent = value.abs().log10().floor();
    10f64.powi(exponent as i32)
}

/// `floor` that snaps values within float noise of an integer onto it.
#[must_use]
pub fn tolerant_floor(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= INTEGER_TOLERANCE * value.abs().max(1.0) {
        nearest
    } else {
        value.floor()
    }
}

/// `ceil` that snaps values within float noise of an integer onto it.
#[must_use]
pub fn tolerant_ceil(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= INTEGER_TOLERANCE * value.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    }
}

/// Rounds to `decimals` base-10 places, halves away from zero.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    round_with(value, decimals, RoundingStrategy::MidpointAwayFromZero, f64::round)
}

/// Rounds up to `decimals` base-10 places.
#[must_use]
pub fn ceil_to(value: f64, decimals: u32) -> f64 {
    round_with(value, decimals, RoundingStrategy::ToPositiveInfinity, f64::ceil)
}

fn round_with(
    value: f64,
    decimals: u32,
    strategy: RoundingStrategy,
    fallback: fn(f64) -> f64,
) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if decimals <= MAX_DECIMAL_PLACES {
        if let Some(rounded) = Decimal::from_f64(value)
            .map(|decimal| decimal.round_dp_with_strategy(decimals, strategy))
            .and_then(|decimal| decimal.to_f64())
        {
            return rounded;
        }
    }

    let scale = 10f64.powi(decimals.min(300) as i32);
    let scaled = fallback(value * scale) / scale;
    if scaled.is_finite() { scaled } else { value }
}

#[must_use]
pub fn approx_equal(lhs: f64, rhs: f64) -> bool {
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() <= scale * 1e-12
}
