use chart_axis::core::rounding::{MAX_SETTLE_PASSES, fix_small_step};
use chart_axis::core::{NiceRange, adjust, adjust_with_precision, settle};

fn assert_range(actual: NiceRange, min: f64, max: f64, step: f64) {
    let epsilon = 1e-9;
    assert!(
        (actual.min - min).abs() <= epsilon
            && (actual.max - max).abs() <= epsilon
            && (actual.step - step).abs() <= epsilon,
        "expected ({min}, {max}, {step}), got {actual:?}"
    );
}

#[test]
fn end_to_end_fixture_rounds_to_twenty_step() {
    // data [12, 47, 83, 19] with a five line grid
    let range = adjust(12.0, 83.0, 5.0, false);
    assert_range(range, 0.0, 100.0, 20.0);
    assert!(range.contains(12.0) && range.contains(83.0));
    assert_eq!(range.interval_count(), 5.0);
}

#[test]
fn loose_pass_pads_before_snapping() {
    assert_range(adjust(5.0, 15.0, 5.0, false), 4.0, 16.0, 2.0);
    assert_range(adjust(0.0, 1.0, 10.0, false), 0.0, 1.1, 0.1);
}

#[test]
fn strict_pass_keeps_already_nice_bounds() {
    assert_range(adjust(0.0, 100.0, 5.0, true), 0.0, 100.0, 20.0);
    assert_range(adjust(0.0, 1.0, 5.0, true), 0.0, 1.0, 0.2);
}

#[test]
fn decimal_ranges_snap_without_float_drift() {
    let range = adjust(0.1, 0.93, 5.0, false);
    assert_range(range, 0.0, 1.0, 0.2);
    assert_eq!(range.step, 0.2);
}

#[test]
fn padding_never_introduces_zero_crossing() {
    let positive = adjust(12.0, 83.0, 5.0, false);
    assert!(positive.min >= 0.0);

    let negative = adjust(-80.0, -12.0, 5.0, false);
    assert_range(negative, -100.0, 0.0, 20.0);
    assert!(negative.max <= 0.0);
}

#[test]
fn mixed_sign_range_spans_zero() {
    assert_range(adjust(-37.0, 52.0, 5.0, false), -40.0, 60.0, 20.0);
}

#[test]
fn reversed_and_non_finite_input_is_sanitized() {
    let reversed = adjust(83.0, 12.0, 5.0, false);
    assert_range(reversed, 0.0, 100.0, 20.0);

    let nan_max = adjust(10.0, f64::NAN, 5.0, false);
    assert!(nan_max.min.is_finite() && nan_max.max.is_finite());
    assert!(nan_max.min <= 10.0 && nan_max.max >= 10.0);
    assert!(nan_max.step > 0.0);

    let both = adjust(f64::NEG_INFINITY, f64::INFINITY, 5.0, true);
    assert!(both.min.is_finite() && both.max.is_finite() && both.step > 0.0);
}

#[test]
fn settle_reaches_fixed_point_for_loose_output() {
    let loose = adjust(5.0, 15.0, 5.0, false);
    let settled = settle(loose.min, loose.max, 5.0, None);
    assert_range(settled, 0.0, 20.0, 5.0);
    assert_eq!(settle(settled.min, settled.max, 5.0, None), settled);
    assert!(MAX_SETTLE_PASSES >= 1);
}

#[test]
fn precision_cap_rounds_step_up() {
    let uncapped = adjust_with_precision(0.0, 0.01, 5.0, true, None);
    assert!(uncapped.step < 0.01);

    let capped = adjust_with_precision(0.0, 0.01, 5.0, true, Some(1));
    assert_eq!(capped.step, 0.1);
    assert!(capped.min <= 0.0 && capped.max >= 0.01);
}

#[test]
fn grid_count_below_one_behaves_as_single_line() {
    let single = adjust(0.0, 100.0, 0.0, true);
    let one = adjust(0.0, 100.0, 1.0, true);
    assert_eq!(single, one);
    assert!(single.contains(0.0) && single.contains(100.0));
}

#[test]
fn tiny_steps_stay_observable() {
    assert!(1.0 + fix_small_step(1e-30) > 1.0);
    assert_eq!(fix_small_step(-1.0), f64::EPSILON);
}
