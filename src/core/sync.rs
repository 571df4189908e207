//! Grid alignment between two linear axes.

use tracing::{debug, warn};

use crate::core::primitives::{decimal_power, tolerant_ceil, tolerant_floor};
use crate::core::rounding::{NiceRange, fix_small_step};

/// Iteration budget of the alignment search.
pub const MAX_SYNC_ITERATIONS: usize = 500;

/// Largest integer ratio between interval counts still considered aligned.
const MAX_COUNT_RATIO: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOutcome {
    pub range: NiceRange,
    pub iterations: usize,
    pub matched: bool,
}

/// Perturbs `own` until its interval count lines up with `target`'s.
///
/// Coarser-than-needed grids move up the 1/2/5/10 ladder; finer ones widen
/// by one step on alternating sides. Widening never introduces a zero
/// crossing `own` did not have. When the budget runs out the last
/// candidate is returned unmatched.
#[must_use]
pub fn sync_to(own: NiceRange, target: NiceRange) -> SyncOutcome {
    let target_count = interval_count(target).max(1.0);
    let non_negative = own.min >= 0.0;
    let non_positive = own.max <= 0.0;

    let mut range = own;
    range.step = fix_small_step(range.step);
    for iteration in 0..MAX_SYNC_ITERATIONS {
        let count = interval_count(range);
        if counts_align(count, target_count) {
            debug!(iteration, count, target_count, "axis grid synced");
            return SyncOutcome {
                range,
                iterations: iteration,
                matched: true,
            };
        }

        if count > target_count {
            range.step = next_nice_step(range.step);
            range.min = tolerant_floor(range.min / range.step) * range.step;
            range.max = tolerant_ceil(range.max / range.step) * range.step;
            continue;
        }

        let widen_max = if non_negative {
            true
        } else if non_positive {
            false
        } else {
            iteration % 2 == 0
        };
        if widen_max {
            range.max += range.step;
        } else {
            range.min -= range.step;
        }
    }

    warn!(
        target_count,
        count = interval_count(range),
        "axis grid sync exhausted its iteration budget"
    );
    SyncOutcome {
        range,
        iterations: MAX_SYNC_ITERATIONS,
        matched: false,
    }
}

fn interval_count(range: NiceRange) -> f64 {
    if range.step > 0.0 && range.step.is_finite() {
        (range.span() / range.step).round()
    } else {
        1.0
    }
}

fn counts_align(count: f64, target: f64) -> bool {
    if count <= 0.0 {
        return false;
    }
    if count == target {
        return true;
    }
    let (large, small) = if count > target {
        (count, target)
    } else {
        (target, count)
    };
    large % small == 0.0 && large / small <= MAX_COUNT_RATIO
}

/// Smallest value of the 1/2/5/10 ladder strictly above `step`.
#[must_use]
pub fn next_nice_step(step: f64) -> f64 {
    let power = decimal_power(step);
    for digit in [1.0, 2.0, 5.0, 10.0] {
        let candidate = digit * power;
        if candidate > step * (1.0 + 1e-9) {
            return candidate;
        }
    }
    20.0 * power
}

#[cfg(test)]
mod tests {
    use super::{counts_align, next_nice_step};

    #[test]
    fn ladder_climbs_one_rung() {
        assert_eq!(next_nice_step(1.0), 2.0);
        assert_eq!(next_nice_step(2.0), 5.0);
        assert_eq!(next_nice_step(5.0), 10.0);
        assert_eq!(next_nice_step(0.25), 0.5);
    }

    #[test]
    fn small_integer_ratios_align() {
        assert!(counts_align(5.0, 5.0));
        assert!(counts_align(10.0, 5.0));
        assert!(counts_align(2.0, 8.0));
        assert!(!counts_align(3.0, 5.0));
        assert!(!counts_align(25.0, 5.0));
    }
}
