//! "Nice" axis bounds and grid steps.
//!
//! [`adjust`] turns an arbitrary numeric interval into bounds and a grid step
//! whose leading digit is one of 1, 2, 5 or 10. The digit snap keeps the
//! asymmetric threshold table `> 5 -> 10`, `(2, 5] -> 5`, `<= 2 -> unchanged`.

use serde::{Deserialize, Serialize};

use crate::core::primitives::{ceil_to, decimal_power, round_to, tolerant_ceil, tolerant_floor};

/// Upper bound on strict re-rounding passes performed by [`settle`].
pub const MAX_SETTLE_PASSES: usize = 8;

/// Rounded axis bounds plus the grid increment between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NiceRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NiceRange {
    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Number of grid intervals between `min` and `max`.
    #[must_use]
    pub fn interval_count(self) -> f64 {
        self.span() / self.step
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Single rounding pass without a precision cap.
#[must_use]
pub fn adjust(min: f64, max: f64, grid_count: f64, strict: bool) -> NiceRange {
    adjust_with_precision(min, max, grid_count, strict, None)
}

/// Single rounding pass.
///
/// Non-strict mode pads each side by one tenth of the range's decimal power
/// before snapping; strict mode snaps outwards without padding. Neither mode
/// introduces a zero crossing the input did not have. `max_precision` caps the
/// step to that many decimal places, rounding up.
#[must_use]
pub fn adjust_with_precision(
    min: f64,
    max: f64,
    grid_count: f64,
    strict: bool,
    max_precision: Option<u32>,
) -> NiceRange {
    let (min, max) = sanitize_bounds(min, max);
    let grid_count = if grid_count.is_finite() && grid_count > 1.0 {
        grid_count.round()
    } else {
        1.0
    };

    let initial_min = min;
    let initial_max = max;

    let mut difference = max - min;
    if difference == 0.0 {
        difference = max.abs();
    }
    if difference == 0.0 {
        difference = 1.0;
    }

    let power = decimal_power(difference) / 10.0;
    let (mut min, mut max) = if strict {
        (
            tolerant_floor(min / power) * power,
            tolerant_ceil(max / power) * power,
        )
    } else {
        (
            tolerant_ceil(min / power) * power - power,
            tolerant_floor(max / power) * power + power,
        )
    };

    if min < 0.0 && initial_min >= 0.0 {
        min = 0.0;
    }
    if max > 0.0 && initial_max <= 0.0 {
        max = 0.0;
    }

    let power = decimal_power(difference) / 100.0;
    let mut step = tolerant_ceil(difference / grid_count / power) * power;
    let step_power = decimal_power(step);
    let divisor = snap_leading_digit(tolerant_ceil(step / step_power));
    step = tolerant_ceil(step / (step_power * divisor)) * step_power * divisor;

    if let Some(precision) = max_precision {
        step = ceil_to(step, precision);
    }

    let mut decimals = 0;
    if step_power < 1.0 {
        decimals = step_power.log10().abs().round() as u32 + 1;
        step = round_to(step, decimals);
    }

    let min_count = tolerant_floor(min / step);
    let mut nice_min = round_to(step * min_count, decimals);

    let mut max_count = if strict {
        tolerant_floor(max / step)
    } else {
        tolerant_ceil(max / step)
    };
    if max_count == min_count {
        max_count += 1.0;
    }
    let mut nice_max = round_to(step * max_count, decimals);

    if nice_max < initial_max {
        nice_max += step;
    }
    if nice_min > initial_min {
        nice_min -= step;
    }

    NiceRange {
        min: nice_min,
        max: nice_max,
        step: fix_small_step(step),
    }
}

/// Repeats the strict pass until its output no longer changes.
///
/// Bounded by [`MAX_SETTLE_PASSES`]; the last candidate is returned when no
/// fixed point is reached (a single-line grid over a zero crossing has none).
#[must_use]
pub fn settle(min: f64, max: f64, grid_count: f64, max_precision: Option<u32>) -> NiceRange {
    let mut current = adjust_with_precision(min, max, grid_count, true, max_precision);
    for _ in 0..MAX_SETTLE_PASSES {
        let next =
            adjust_with_precision(current.min, current.max, grid_count, true, max_precision);
        if next == current {
            return current;
        }
        current = next;
    }
    current
}

/// Doubles a step until adding it to 1.0 is observable in f64.
///
/// Zero, negative and non-finite steps start from the smallest positive
/// normal value, so the result is always a usable positive increment.
#[must_use]
pub fn fix_small_step(step: f64) -> f64 {
    let mut step = if step.is_finite() && step > 0.0 {
        step
    } else {
        f64::MIN_POSITIVE
    };
    while 1.0 + step == 1.0 {
        step *= 2.0;
    }
    step
}

/// Half of the decimal power of `value`; used to widen a collapsed domain.
#[must_use]
pub fn degenerate_delta(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return 0.5;
    }
    decimal_power(value) / 2.0
}

fn snap_leading_digit(digit: f64) -> f64 {
    if digit > 5.0 {
        10.0
    } else if digit > 2.0 {
        5.0
    } else {
        digit.max(1.0)
    }
}

fn sanitize_bounds(min: f64, max: f64) -> (f64, f64) {
    let (min, max) = match (min.is_finite(), max.is_finite()) {
        (true, true) => (min, max),
        (true, false) => (min, min),
        (false, true) => (max, max),
        (false, false) => (0.0, 0.0),
    };
    if min > max { (max, min) } else { (min, max) }
}

#[cfg(test)]
mod tests {
    use super::{degenerate_delta, fix_small_step, snap_leading_digit};

    #[test]
    fn leading_digit_table_is_asymmetric() {
        assert_eq!(snap_leading_digit(1.0), 1.0);
        assert_eq!(snap_leading_digit(2.0), 2.0);
        assert_eq!(snap_leading_digit(3.0), 5.0);
        assert_eq!(snap_leading_digit(5.0), 5.0);
        assert_eq!(snap_leading_digit(6.0), 10.0);
    }

    #[test]
    fn zero_step_becomes_machine_epsilon() {
        assert_eq!(fix_small_step(0.0), f64::EPSILON);
        assert_eq!(fix_small_step(f64::NAN), f64::EPSILON);
        assert_eq!(fix_small_step(0.25), 0.25);
    }

    #[test]
    fn degenerate_delta_uses_half_decimal_power() {
        assert_eq!(degenerate_delta(10.0), 5.0);
        assert_eq!(degenerate_delta(0.0), 0.5);
        assert_eq!(degenerate_delta(-420.0), 50.0);
    }
}
