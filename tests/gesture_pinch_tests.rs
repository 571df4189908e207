use approx::assert_relative_eq;
use chart_axis::core::{
    AxisConfig, AxisDirection, AxisId, PlotSize, Point, ZoomOutcome, ZoomPriority,
};
use chart_axis::interaction::{AxisGestureState, GestureMapper, ZoomTarget};
use chart_axis::{AxisEngine, EngineConfig, GestureConfig, GestureMode, PointerId};
use smallvec::SmallVec;

/// Single horizontal axis recording every request it receives.
struct RecordingTarget {
    start: f64,
    end: f64,
    zooms: Vec<(f64, f64)>,
}

impl RecordingTarget {
    fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            zooms: Vec::new(),
        }
    }
}

impl ZoomTarget for RecordingTarget {
    fn gesture_axes(&self) -> SmallVec<[AxisGestureState; 4]> {
        let mut axes = SmallVec::new();
        axes.push(AxisGestureState {
            id: AxisId::new(0),
            direction: AxisDirection::Horizontal,
            inverted: false,
            start: self.start,
            end: self.end,
            max_deviation: 0.5,
            max_zoom_factor: 100.0,
            pannable: true,
            zoomable: true,
        });
        axes
    }

    fn request_zoom(
        &mut self,
        _axis: AxisId,
        start: f64,
        end: f64,
        _duration_ms: f64,
        _priority: Option<ZoomPriority>,
    ) -> ZoomOutcome {
        self.start = start;
        self.end = end;
        self.zooms.push((start, end));
        ZoomOutcome::Applied
    }

    fn set_pan_position(&mut self, _axis: AxisId, start: f64, end: f64) {
        self.start = start;
        self.end = end;
    }
}

#[test]
fn spreading_fingers_zooms_in_around_them() {
    let mut mapper =
        GestureMapper::new(GestureConfig::default(), PlotSize::new(1000.0, 500.0)).expect("mapper");
    let mut target = RecordingTarget::new(0.0, 1.0);

    mapper.on_pointer_down(&mut target, PointerId(1), Point::new(200.0, 100.0));
    mapper.on_pointer_down(&mut target, PointerId(2), Point::new(800.0, 100.0));
    assert_eq!(mapper.mode(), GestureMode::PinchActive);
    assert_eq!(mapper.pointer_count(), 2);

    mapper.on_pointer_move(&mut target, PointerId(1), Point::new(100.0, 100.0));
    mapper.on_pointer_move(&mut target, PointerId(2), Point::new(900.0, 100.0));

    assert_relative_eq!(target.start, 0.125, epsilon = 1e-12);
    assert_relative_eq!(target.end, 0.875, epsilon = 1e-12);
    assert_eq!(target.zooms.len(), 2);

    let span = target.end - target.start;
    assert_relative_eq!(target.start + 0.1 * span, 0.2, epsilon = 1e-12);
    assert_relative_eq!(target.start + 0.9 * span, 0.8, epsilon = 1e-12);
}

#[test]
fn finger_order_does_not_matter() {
    let mut mapper =
        GestureMapper::new(GestureConfig::default(), PlotSize::new(1000.0, 500.0)).expect("mapper");
    let mut target = RecordingTarget::new(0.0, 1.0);

    mapper.on_pointer_down(&mut target, PointerId(1), Point::new(800.0, 100.0));
    mapper.on_pointer_down(&mut target, PointerId(2), Point::new(200.0, 100.0));
    mapper.on_pointer_move(&mut target, PointerId(1), Point::new(900.0, 100.0));
    mapper.on_pointer_move(&mut target, PointerId(2), Point::new(100.0, 100.0));

    assert_relative_eq!(target.start, 0.125, epsilon = 1e-12);
    assert_relative_eq!(target.end, 0.875, epsilon = 1e-12);
}

#[test]
fn lifting_one_finger_falls_back_to_pan() {
    let mut mapper =
        GestureMapper::new(GestureConfig::default(), PlotSize::new(1000.0, 500.0)).expect("mapper");
    let mut target = RecordingTarget::new(0.0, 1.0);

    mapper.on_pointer_down(&mut target, PointerId(1), Point::new(200.0, 100.0));
    mapper.on_pointer_down(&mut target, PointerId(2), Point::new(800.0, 100.0));
    mapper.on_pointer_move(&mut target, PointerId(2), Point::new(900.0, 100.0));

    mapper.on_pointer_up(&mut target, PointerId(2));
    assert_eq!(mapper.mode(), GestureMode::PanActive);
    assert_eq!(mapper.pointer_count(), 1);

    let (start, end) = (target.start, target.end);
    mapper.on_pointer_move(&mut target, PointerId(1), Point::new(100.0, 100.0));
    let shift = (end - start) * 0.1;
    assert_relative_eq!(target.start, start + shift, epsilon = 1e-12);
    assert_relative_eq!(target.end, end + shift, epsilon = 1e-12);

    mapper.on_pointer_up(&mut target, PointerId(1));
    assert_eq!(mapper.mode(), GestureMode::Idle);
}

#[test]
fn engine_pinch_zooms_horizontal_axis_only() {
    let config = EngineConfig::new(PlotSize::new(1000.0, 500.0));
    let mut engine = AxisEngine::new(config).expect("engine init");
    let x = engine
        .add_axis(AxisConfig::value(AxisDirection::Horizontal))
        .expect("x axis");
    let y = engine
        .add_axis(AxisConfig::value(AxisDirection::Vertical))
        .expect("y axis");

    engine.pointer_down(PointerId(1), Point::new(200.0, 100.0));
    engine.pointer_down(PointerId(2), Point::new(800.0, 400.0));
    assert_eq!(engine.gesture_mode(), GestureMode::PinchActive);
    engine.pointer_move(PointerId(1), Point::new(100.0, 0.0));
    engine.pointer_move(PointerId(2), Point::new(900.0, 500.0));

    let viewport = engine.viewport(x).expect("x viewport");
    assert_relative_eq!(viewport.start(), 0.125, epsilon = 1e-12);
    assert_relative_eq!(viewport.end(), 0.875, epsilon = 1e-12);
    let vertical = engine.viewport(y).expect("y viewport");
    assert_eq!((vertical.start(), vertical.end()), (0.0, 1.0));
}

#[test]
fn vertical_pinch_follows_fingers_when_enabled() {
    let gestures = GestureConfig::default().with_pinch_zoom(false, true);
    let config = EngineConfig::new(PlotSize::new(1000.0, 500.0)).with_gestures(gestures);
    let mut engine = AxisEngine::new(config).expect("engine init");
    let x = engine
        .add_axis(AxisConfig::value(AxisDirection::Horizontal))
        .expect("x axis");
    let y = engine
        .add_axis(AxisConfig::value(AxisDirection::Vertical))
        .expect("y axis");

    engine.pointer_down(PointerId(1), Point::new(500.0, 400.0));
    engine.pointer_down(PointerId(2), Point::new(500.0, 100.0));
    engine.pointer_move(PointerId(1), Point::new(500.0, 450.0));
    engine.pointer_move(PointerId(2), Point::new(500.0, 50.0));

    let vertical = engine.viewport(y).expect("y viewport");
    assert_relative_eq!(vertical.start(), 0.125, epsilon = 1e-12);
    assert_relative_eq!(vertical.end(), 0.875, epsilon = 1e-12);
    let horizontal = engine.viewport(x).expect("x viewport");
    assert_eq!((horizontal.start(), horizontal.end()), (0.0, 1.0));
}
