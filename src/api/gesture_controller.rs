use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::core::{AnimationIds, AxisId, Point, ZoomOutcome, ZoomPriority};
use crate::interaction::{AxisGestureState, GestureConfig, GestureMode, PointerId, ZoomTarget};
use crate::error::AxisResult;

use super::{AxisEngine, AxisNode};

/// Engine viewports exposed to the gesture mapper for one input event.
struct EngineZoomTarget<'a> {
    axes: &'a mut IndexMap<AxisId, AxisNode>,
    ids: &'a mut AnimationIds,
    now_ms: f64,
}

impl ZoomTarget for EngineZoomTarget<'_> {
    fn gesture_axes(&self) -> SmallVec<[AxisGestureState; 4]> {
        self.axes
            .iter()
            .map(|(id, node)| {
                let config = node.scale.config();
                AxisGestureState {
                    id: *id,
                    direction: config.direction,
                    inverted: config.inverted,
                    start: node.viewport.start(),
                    end: node.viewport.end(),
                    max_deviation: node.viewport.config().max_deviation,
                    max_zoom_factor: node.viewport.limits().max_factor,
                    pannable: config.pannable,
                    zoomable: config.zoomable,
                }
            })
            .collect()
    }

    fn request_zoom(
        &mut self,
        axis: AxisId,
        start: f64,
        end: f64,
        duration_ms: f64,
        priority: Option<ZoomPriority>,
    ) -> ZoomOutcome {
        match self.axes.get_mut(&axis) {
            Some(node) => node
                .viewport
                .zoom(start, end, duration_ms, priority, self.now_ms, self.ids),
            None => ZoomOutcome::Unchanged,
        }
    }

    fn set_pan_position(&mut self, axis: AxisId, start: f64, end: f64) {
        if let Some(node) = self.axes.get_mut(&axis) {
            node.viewport.set_direct(start, end);
        }
    }
}

impl AxisEngine {
    #[must_use]
    pub fn gesture_mode(&self) -> GestureMode {
        self.gestures.mode()
    }

    #[must_use]
    pub fn gesture_config(&self) -> GestureConfig {
        self.gestures.config()
    }

    pub fn set_gesture_config(&mut self, config: GestureConfig) -> AxisResult<()> {
        self.gestures.set_config(config)?;
        self.config.gestures = config;
        Ok(())
    }

    /// Wheel input at plot-local `point`. Returns whether any axis reacted.
    pub fn wheel(&mut self, point: Point, delta_x: f64, delta_y: f64) -> bool {
        let mut target = EngineZoomTarget {
            axes: &mut self.axes,
            ids: &mut self.ids,
            now_ms: self.clock_ms,
        };
        self.gestures.on_wheel(&mut target, point, delta_x, delta_y)
    }

    pub fn pointer_down(&mut self, pointer: PointerId, point: Point) {
        let mut target = EngineZoomTarget {
            axes: &mut self.axes,
            ids: &mut self.ids,
            now_ms: self.clock_ms,
        };
        self.gestures.on_pointer_down(&mut target, pointer, point);
    }

    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) {
        let mut target = EngineZoomTarget {
            axes: &mut self.axes,
            ids: &mut self.ids,
            now_ms: self.clock_ms,
        };
        self.gestures.on_pointer_move(&mut target, pointer, point);
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        let mut target = EngineZoomTarget {
            axes: &mut self.axes,
            ids: &mut self.ids,
            now_ms: self.clock_ms,
        };
        self.gestures.on_pointer_up(&mut target, pointer);
    }

    pub fn cancel_gesture(&mut self) {
        self.gestures.cancel();
    }
}
