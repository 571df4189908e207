use chart_axis::core::axis_scale::compute_extremes;
use chart_axis::core::{
    AnimationIds, AxisConfig, AxisDirection, AxisId, AxisScale, DomainScale, ExtremesInput,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn value_position_round_trip_property(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let max = min + span;
        let value = min + value_factor * span;

        let config = AxisConfig::value(AxisDirection::Vertical)
            .with_bounds(Some(min), Some(max))
            .with_strict_min_max(true);
        let mut scale = AxisScale::new(AxisId::new(0), config).expect("valid scale");
        let mut ids = AnimationIds::default();
        let input = ExtremesInput { length_px: 600.0, ..ExtremesInput::default() };
        let _ = scale.recompute_extremes(&input, 0.0, &mut ids);

        let position = scale.value_to_position(value).expect("to position");
        let recovered = scale.position_to_value(position).expect("from position");
        prop_assert!((recovered - value).abs() <= 1e-7);
    }

    #[test]
    fn log_position_round_trip_property(
        exponent in -6.0f64..6.0,
        decades in 1u32..8,
        value_factor in 0.0f64..1.0
    ) {
        let min = 10f64.powf(exponent);
        let max = min * 10f64.powi(decades as i32);
        let value = (min.ln() + value_factor * (max.ln() - min.ln())).exp();

        let scale = DomainScale::logarithmic(min, max, min).expect("valid scale");
        let recovered = scale.position_to_value(scale.value_to_position(value));
        prop_assert!(((recovered - value) / value).abs() <= 1e-9);
    }

    #[test]
    fn finals_contain_data_and_step_divides_span(
        low in -100_000.0f64..100_000.0,
        span in prop_oneof![Just(0.0f64), 1.0f64..100_000.0],
        length in 40.0f64..2_000.0
    ) {
        let input = ExtremesInput {
            series: Some((low, low + span)),
            length_px: length,
            ..ExtremesInput::default()
        };
        let config = AxisConfig::value(AxisDirection::Vertical);
        let extremes = compute_extremes(&config, &input).expect("extremes");
        prop_assert!(extremes.min_final <= low);
        prop_assert!(extremes.max_final >= low + span);
        prop_assert!(extremes.max_final > extremes.min_final);

        let intervals = (extremes.max_final - extremes.min_final) / extremes.step;
        prop_assert!((intervals - intervals.round()).abs() <= 1e-6);
    }
}
