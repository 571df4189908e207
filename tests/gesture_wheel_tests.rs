use approx::assert_relative_eq;
use chart_axis::core::{AxisConfig, AxisDirection, AxisId, PlotSize, Point, ViewportConfig};
use chart_axis::{AxisEngine, EngineConfig, GestureConfig, WheelBehavior};

fn engine_with(gestures: GestureConfig, viewport: ViewportConfig) -> (AxisEngine, AxisId, AxisId) {
    let config = EngineConfig::new(PlotSize::new(1000.0, 500.0)).with_gestures(gestures);
    let mut engine = AxisEngine::new(config).expect("engine init");
    let x = engine
        .add_axis(AxisConfig::value(AxisDirection::Horizontal).with_viewport(viewport))
        .expect("x axis");
    let y = engine
        .add_axis(AxisConfig::value(AxisDirection::Vertical).with_viewport(viewport))
        .expect("y axis");
    (engine, x, y)
}

fn window(engine: &AxisEngine, axis: AxisId) -> (f64, f64) {
    let viewport = engine.viewport(axis).expect("viewport");
    (viewport.start(), viewport.end())
}

#[test]
fn wheel_up_zooms_in_around_pointer() {
    let (mut engine, x, y) = engine_with(GestureConfig::default(), ViewportConfig::default());

    assert!(engine.wheel(Point::new(250.0, 100.0), 0.0, -100.0));
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.05);
    assert_relative_eq!(end, 0.85);

    let anchor = start + 0.25 * (end - start);
    assert_relative_eq!(anchor, 0.25);
    assert_eq!(window(&engine, y), (0.0, 1.0));
}

#[test]
fn wheel_down_zooms_out_within_deviation() {
    let (mut engine, x, _) = engine_with(
        GestureConfig::default(),
        ViewportConfig::default().with_max_deviation(0.0),
    );
    engine
        .zoom(x, 0.25, 0.75, 0.0, None)
        .expect("initial zoom");

    assert!(engine.wheel(Point::new(500.0, 100.0), 0.0, 100.0));
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.2);
    assert_relative_eq!(end, 0.8);

    for _ in 0..20 {
        engine.wheel(Point::new(500.0, 100.0), 0.0, 100.0);
    }
    assert_eq!(window(&engine, x), (0.0, 1.0));
}

#[test]
fn wheel_zoom_respects_max_zoom_factor() {
    let (mut engine, x, _) = engine_with(
        GestureConfig::default().with_wheel_step(0.5),
        ViewportConfig::default().with_max_zoom_factor(3.0),
    );
    for _ in 0..10 {
        engine.wheel(Point::new(500.0, 100.0), 0.0, -100.0);
    }
    let (start, end) = window(&engine, x);
    assert!(1.0 / (end - start) <= 3.0 + 1e-9);
    assert_relative_eq!(start, 0.25);
    assert_relative_eq!(end, 0.75);
}

#[test]
fn wheel_pan_shifts_window_and_stays_inside() {
    let gestures = GestureConfig::default().with_wheel(WheelBehavior::PanX, WheelBehavior::None);
    let (mut engine, x, _) = engine_with(gestures, ViewportConfig::default());
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("initial zoom");

    assert!(engine.wheel(Point::new(500.0, 100.0), 100.0, 0.0));
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.35);
    assert_relative_eq!(end, 0.85);

    for _ in 0..10 {
        engine.wheel(Point::new(500.0, 100.0), 100.0, 0.0);
    }
    let (start, end) = window(&engine, x);
    assert_relative_eq!(end, 1.0);
    assert_relative_eq!(start, 0.5);
}

#[test]
fn vertical_wheel_pan_moves_up_for_negative_delta() {
    let gestures = GestureConfig::default().with_wheel(WheelBehavior::None, WheelBehavior::PanY);
    let (mut engine, x, y) = engine_with(gestures, ViewportConfig::default());
    engine.zoom(y, 0.25, 0.75, 0.0, None).expect("initial zoom");

    assert!(engine.wheel(Point::new(500.0, 100.0), 0.0, -100.0));
    let (start, end) = window(&engine, y);
    assert_relative_eq!(start, 0.35);
    assert_relative_eq!(end, 0.85);
    assert_eq!(window(&engine, x), (0.0, 1.0));
}

#[test]
fn wheel_outside_plot_or_non_finite_is_ignored() {
    let (mut engine, x, _) = engine_with(GestureConfig::default(), ViewportConfig::default());
    assert!(!engine.wheel(Point::new(-5.0, 100.0), 0.0, -100.0));
    assert!(!engine.wheel(Point::new(100.0, 100.0), 0.0, f64::NAN));
    assert!(!engine.wheel(Point::new(100.0, 100.0), 0.0, 0.0));
    assert_eq!(window(&engine, x), (0.0, 1.0));
}

#[test]
fn non_zoomable_axis_ignores_wheel_zoom() {
    let config = EngineConfig::new(PlotSize::new(1000.0, 500.0));
    let mut engine = AxisEngine::new(config).expect("engine init");
    let x = engine
        .add_axis(AxisConfig::value(AxisDirection::Horizontal).with_interaction(true, false))
        .expect("x axis");
    assert!(!engine.wheel(Point::new(500.0, 100.0), 0.0, -100.0));
    assert_eq!(window(&engine, x), (0.0, 1.0));
}

#[test]
fn animated_wheel_zoom_reaches_target_on_tick() {
    let gestures = GestureConfig {
        wheel_duration_ms: 100.0,
        ..GestureConfig::default()
    };
    let (mut engine, x, _) = engine_with(gestures, ViewportConfig::default());
    assert!(engine.wheel(Point::new(250.0, 100.0), 0.0, -100.0));
    assert_eq!(window(&engine, x), (0.0, 1.0));

    engine.tick(100.0).expect("tick");
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.05);
    assert_relative_eq!(end, 0.85);
}
