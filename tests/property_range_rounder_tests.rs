use chart_axis::core::{adjust, settle};
use proptest::prelude::*;

fn leading_digit(step: f64) -> f64 {
    let power = 10f64.powf(step.log10().floor());
    step / power
}

proptest! {
    #[test]
    fn nice_step_leading_digit_is_one_two_five_or_ten(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        grid in 1u32..=20,
        strict in any::<bool>()
    ) {
        let range = adjust(min, min + span, f64::from(grid), strict);
        let digit = leading_digit(range.step);
        let snapped = digit.round();
        prop_assert!((digit - snapped).abs() <= 1e-6);
        prop_assert!([1.0, 2.0, 5.0, 10.0].contains(&snapped));
    }

    #[test]
    fn rounded_bounds_contain_input(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        grid in 1u32..=20,
        strict in any::<bool>()
    ) {
        let max = min + span;
        let range = adjust(min, max, f64::from(grid), strict);
        prop_assert!(range.min <= min);
        prop_assert!(range.max >= max);
        prop_assert!(range.step > 0.0);
    }

    #[test]
    fn settled_bounds_are_idempotent(
        min in -10_000.0f64..10_000.0,
        span in 0.001f64..10_000.0,
        grid in 2u32..=20
    ) {
        let grid = f64::from(grid);
        let loose = adjust(min, min + span, grid, false);
        let settled = settle(loose.min, loose.max, grid, None);
        let again = settle(settled.min, settled.max, grid, None);
        prop_assert_eq!(settled, again);
        prop_assert!(settled.min <= min && settled.max >= min + span);
    }

    #[test]
    fn non_negative_input_stays_non_negative(
        min in 0.0f64..1_000.0,
        span in 0.001f64..1_000.0,
        grid in 1u32..=20
    ) {
        let range = adjust(min, min + span, f64::from(grid), false);
        prop_assert!(range.min >= 0.0);
    }
}
