use approx::assert_relative_eq;
use chart_axis::core::{AxisConfig, AxisDirection, AxisId, PlotSize, Point, ViewportConfig};
use chart_axis::{AxisEngine, EngineConfig, GestureConfig, GestureMode, PointerId};

fn engine(gestures: GestureConfig, viewport: ViewportConfig) -> (AxisEngine, AxisId, AxisId) {
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
fn drag_right_moves_window_towards_lower_values() {
    let (mut engine, x, y) = engine(GestureConfig::default(), ViewportConfig::default());
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("zoom");
    engine.zoom(y, 0.25, 0.75, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(500.0, 200.0));
    assert_eq!(engine.gesture_mode(), GestureMode::PanActive);

    engine.pointer_move(finger, Point::new(600.0, 300.0));
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.2);
    assert_relative_eq!(end, 0.7);
    assert_eq!(window(&engine, y), (0.25, 0.75));

    engine.pointer_up(finger);
    assert_eq!(engine.gesture_mode(), GestureMode::Idle);
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.2);
    assert_relative_eq!(end, 0.7);
}

#[test]
fn pan_is_measured_from_pointer_down() {
    let (mut engine, x, _) = engine(GestureConfig::default(), ViewportConfig::default());
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("zoom");

    let finger = PointerId(7);
    engine.pointer_down(finger, Point::new(500.0, 200.0));
    engine.pointer_move(finger, Point::new(300.0, 200.0));
    engine.pointer_move(finger, Point::new(400.0, 200.0));

    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.3);
    assert_relative_eq!(end, 0.8);
}

#[test]
fn vertical_pan_follows_pointer_when_enabled() {
    let gestures = GestureConfig::default().with_pan(false, true);
    let (mut engine, x, y) = engine(gestures, ViewportConfig::default());
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("zoom");
    engine.zoom(y, 0.25, 0.75, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(500.0, 200.0));
    engine.pointer_move(finger, Point::new(400.0, 300.0));

    let (start, end) = window(&engine, y);
    assert_relative_eq!(start, 0.35);
    assert_relative_eq!(end, 0.85);
    assert_eq!(window(&engine, x), (0.25, 0.75));
}

#[test]
fn inverted_axis_pans_the_other_way() {
    let config = EngineConfig::new(PlotSize::new(1000.0, 500.0));
    let mut engine = AxisEngine::new(config).expect("engine init");
    let x = engine
        .add_axis(AxisConfig::value(AxisDirection::Horizontal).with_inverted(true))
        .expect("x axis");
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(500.0, 200.0));
    engine.pointer_move(finger, Point::new(600.0, 200.0));

    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.3);
    assert_relative_eq!(end, 0.8);
}

#[test]
fn overshoot_is_pulled_back_on_release() {
    let (mut engine, x, _) = engine(
        GestureConfig::default(),
        ViewportConfig::default().with_max_deviation(0.1),
    );
    engine.zoom(x, 0.0, 0.5, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(200.0, 200.0));
    engine.pointer_move(finger, Point::new(600.0, 200.0));
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, -0.2);
    assert_relative_eq!(end, 0.3);

    engine.pointer_up(finger);
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, -0.05);
    assert_relative_eq!(end, 0.45);

    let report = engine.tick(16.0).expect("tick");
    assert!(report.settled(x));
}

#[test]
fn repeated_overshooting_drags_keep_zoom_level() {
    let (mut engine, x, _) = engine(
        GestureConfig::default(),
        ViewportConfig::default().with_max_deviation(0.1),
    );
    engine.zoom(x, 0.0, 0.5, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    for frame in 0..4 {
        engine.pointer_down(finger, Point::new(100.0, 200.0));
        engine.pointer_move(finger, Point::new(900.0, 200.0));
        engine.pointer_up(finger);
        engine.tick(f64::from(frame) * 16.0).expect("tick");

        let (start, end) = window(&engine, x);
        assert_relative_eq!(end - start, 0.5, epsilon = 1e-12);
        assert_relative_eq!(start, -0.05, epsilon = 1e-12);
        assert_relative_eq!(end, 0.45, epsilon = 1e-12);
    }
}

#[test]
fn animated_settle_reaches_bounds_over_time() {
    let (mut engine, x, _) = engine(
        GestureConfig::default().with_settle_duration_ms(200.0),
        ViewportConfig::default().with_max_deviation(0.0),
    );
    engine.zoom(x, 0.0, 0.5, 0.0, None).expect("zoom");
    engine.tick(0.0).expect("tick");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(200.0, 200.0));
    engine.pointer_move(finger, Point::new(400.0, 200.0));
    engine.pointer_up(finger);
    let (start, _) = window(&engine, x);
    assert_relative_eq!(start, -0.1);

    engine.tick(200.0).expect("tick");
    let (start, end) = window(&engine, x);
    assert_relative_eq!(start, 0.0);
    assert_relative_eq!(end, 0.5);
}

#[test]
fn full_window_cannot_be_dragged_past_deviation_span() {
    let (mut engine, x, _) = engine(
        GestureConfig::default(),
        ViewportConfig::default().with_max_deviation(0.0),
    );

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(500.0, 200.0));
    engine.pointer_move(finger, Point::new(700.0, 200.0));
    assert_eq!(window(&engine, x), (0.0, 1.0));
}

#[test]
fn pointer_down_outside_plot_is_not_tracked() {
    let (mut engine, x, _) = engine(GestureConfig::default(), ViewportConfig::default());
    engine.zoom(x, 0.25, 0.75, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(1200.0, 200.0));
    assert_eq!(engine.gesture_mode(), GestureMode::Idle);
    engine.pointer_move(finger, Point::new(600.0, 200.0));
    assert_eq!(window(&engine, x), (0.25, 0.75));
}

#[test]
fn cancel_drops_gesture_without_settling() {
    let (mut engine, x, _) = engine(
        GestureConfig::default(),
        ViewportConfig::default().with_max_deviation(0.1),
    );
    engine.zoom(x, 0.0, 0.5, 0.0, None).expect("zoom");

    let finger = PointerId(1);
    engine.pointer_down(finger, Point::new(200.0, 200.0));
    engine.pointer_move(finger, Point::new(600.0, 200.0));
    engine.cancel_gesture();
    assert_eq!(engine.gesture_mode(), GestureMode::Idle);

    engine.pointer_up(finger);
    let (start, _) = window(&engine, x);
    assert_relative_eq!(start, -0.2);
}
