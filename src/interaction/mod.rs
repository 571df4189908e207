//! Pointer and wheel input mapped onto axis viewports.
//!
//! The mapper owns only gesture state. Axis windows are read and written
//! through [`ZoomTarget`], which the engine implements over its viewports.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::{
    AxisDirection, AxisId, PlotSize, Point, ZoomOutcome, ZoomPriority, shift_within_deviation,
};
use crate::error::{AxisError, AxisResult};

/// Wheel delta units per wheel "notch".
const WHEEL_DELTA_UNITS: f64 = 100.0;

/// Smallest axis distance between pinch fingers used in the scale ratio.
const MIN_PINCH_DISTANCE: f64 = 0.001;

/// What one wheel axis does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WheelBehavior {
    ZoomX,
    ZoomY,
    ZoomXY,
    PanX,
    PanY,
    PanXY,
    #[default]
    None,
}

impl WheelBehavior {
    fn zooms(self, direction: AxisDirection) -> bool {
        matches!(
            (self, direction),
            (Self::ZoomX | Self::ZoomXY, AxisDirection::Horizontal)
                | (Self::ZoomY | Self::ZoomXY, AxisDirection::Vertical)
        )
    }

    fn pans(self, direction: AxisDirection) -> bool {
        matches!(
            (self, direction),
            (Self::PanX | Self::PanXY, AxisDirection::Horizontal)
                | (Self::PanY | Self::PanXY, AxisDirection::Vertical)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "default_wheel_y")]
    pub wheel_y: WheelBehavior,
    #[serde(default)]
    pub wheel_x: WheelBehavior,
    /// Fraction of the current span moved per wheel notch.
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f64,
    #[serde(default)]
    pub wheel_duration_ms: f64,
    #[serde(default = "default_true")]
    pub pan_x: bool,
    #[serde(default)]
    pub pan_y: bool,
    #[serde(default = "default_true")]
    pub pinch_zoom_x: bool,
    #[serde(default)]
    pub pinch_zoom_y: bool,
    /// Duration of the zoom pulling an overshot pan back inside bounds.
    #[serde(default)]
    pub settle_duration_ms: f64,
}

fn default_wheel_y() -> WheelBehavior {
    WheelBehavior::ZoomX
}

fn default_wheel_step() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            wheel_y: default_wheel_y(),
            wheel_x: WheelBehavior::None,
            wheel_step: default_wheel_step(),
            wheel_duration_ms: 0.0,
            pan_x: true,
            pan_y: false,
            pinch_zoom_x: true,
            pinch_zoom_y: false,
            settle_duration_ms: 0.0,
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn with_wheel(mut self, wheel_x: WheelBehavior, wheel_y: WheelBehavior) -> Self {
        self.wheel_x = wheel_x;
        self.wheel_y = wheel_y;
        self
    }

    #[must_use]
    pub fn with_wheel_step(mut self, wheel_step: f64) -> Self {
        self.wheel_step = wheel_step;
        self
    }

    #[must_use]
    pub fn with_pan(mut self, pan_x: bool, pan_y: bool) -> Self {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
        self
    }

    #[must_use]
    pub fn with_pinch_zoom(mut self, pinch_zoom_x: bool, pinch_zoom_y: bool) -> Self {
        self.pinch_zoom_x = pinch_zoom_x;
        self.pinch_zoom_y = pinch_zoom_y;
        self
    }

    #[must_use]
    pub fn with_settle_duration_ms(mut self, settle_duration_ms: f64) -> Self {
        self.settle_duration_ms = settle_duration_ms;
        self
    }

    pub fn validate(self) -> AxisResult<Self> {
        if !self.wheel_step.is_finite() || self.wheel_step <= 0.0 {
            return Err(AxisError::InvalidConfig(
                "wheel step must be finite and > 0".to_owned(),
            ));
        }
        for duration in [self.wheel_duration_ms, self.settle_duration_ms] {
            if !duration.is_finite() || duration < 0.0 {
                return Err(AxisError::InvalidConfig(
                    "gesture durations must be finite and >= 0".to_owned(),
                ));
            }
        }
        Ok(self)
    }

    fn pans(self, direction: AxisDirection) -> bool {
        match direction {
            AxisDirection::Horizontal => self.pan_x,
            AxisDirection::Vertical => self.pan_y,
        }
    }

    fn pinches(self, direction: AxisDirection) -> bool {
        match direction {
            AxisDirection::Horizontal => self.pinch_zoom_x,
            AxisDirection::Vertical => self.pinch_zoom_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    PanActive,
    PinchActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointerId(pub u64);

/// Window and interaction flags of one axis as seen by the gesture mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGestureState {
    pub id: AxisId,
    pub direction: AxisDirection,
    pub inverted: bool,
    pub start: f64,
    pub end: f64,
    pub max_deviation: f64,
    pub max_zoom_factor: f64,
    pub pannable: bool,
    pub zoomable: bool,
}

impl AxisGestureState {
    /// Window-relative position of a plot point along this axis.
    #[must_use]
    pub fn relative_position(&self, point: Point, plot: PlotSize) -> f64 {
        let position = self.direction.relative(point, plot);
        if self.inverted { 1.0 - position } else { position }
    }
}

/// Axis windows a gesture reads and mutates.
pub trait ZoomTarget {
    fn gesture_axes(&self) -> SmallVec<[AxisGestureState; 4]>;

    fn request_zoom(
        &mut self,
        axis: AxisId,
        start: f64,
        end: f64,
        duration_ms: f64,
        priority: Option<ZoomPriority>,
    ) -> ZoomOutcome;

    /// Unanimated, unclamped window update used while dragging.
    fn set_pan_position(&mut self, axis: AxisId, start: f64, end: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisAnchor {
    id: AxisId,
    direction: AxisDirection,
    inverted: bool,
    start: f64,
    end: f64,
    max_deviation: f64,
}

impl AxisAnchor {
    fn from_state(state: &AxisGestureState) -> Self {
        Self {
            id: state.id,
            direction: state.direction,
            inverted: state.inverted,
            start: state.start,
            end: state.end,
            max_deviation: state.max_deviation,
        }
    }

    fn relative(&self, point: Point, plot: PlotSize) -> f64 {
        let position = self.direction.relative(point, plot);
        if self.inverted { 1.0 - position } else { position }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PanGesture {
    pointer: PointerId,
    down: Point,
    axes: SmallVec<[AxisAnchor; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
struct PinchGesture {
    pointers: [PointerId; 2],
    down: [Point; 2],
    axes: SmallVec<[AxisAnchor; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
enum ActiveGesture {
    Pan(PanGesture),
    Pinch(PinchGesture),
}

/// Gesture state machine: Idle, PanActive, PinchActive.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureMapper {
    config: GestureConfig,
    plot: PlotSize,
    pointers: IndexMap<PointerId, Point>,
    active: Option<ActiveGesture>,
}

impl GestureMapper {
    pub fn new(config: GestureConfig, plot: PlotSize) -> AxisResult<Self> {
        if !plot.is_valid() {
            return Err(AxisError::InvalidPlotSize {
                width: plot.width,
                height: plot.height,
            });
        }
        Ok(Self {
            config: config.validate()?,
            plot,
            pointers: IndexMap::new(),
            active: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> GestureConfig {
        self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) -> AxisResult<()> {
        self.config = config.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn plot(&self) -> PlotSize {
        self.plot
    }

    pub fn set_plot(&mut self, plot: PlotSize) -> AxisResult<()> {
        if !plot.is_valid() {
            return Err(AxisError::InvalidPlotSize {
                width: plot.width,
                height: plot.height,
            });
        }
        self.plot = plot;
        Ok(())
    }

    #[must_use]
    pub fn mode(&self) -> GestureMode {
        match self.active {
            None => GestureMode::Idle,
            Some(ActiveGesture::Pan(_)) => GestureMode::PanActive,
            Some(ActiveGesture::Pinch(_)) => GestureMode::PinchActive,
        }
    }

    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Applies wheel deltas. Returns whether any axis was addressed.
    pub fn on_wheel<T: ZoomTarget>(
        &mut self,
        target: &mut T,
        point: Point,
        delta_x: f64,
        delta_y: f64,
    ) -> bool {
        if !point.is_finite() || !delta_x.is_finite() || !delta_y.is_finite() {
            warn!(delta_x, delta_y, "ignoring non-finite wheel event");
            return false;
        }
        if !self.plot.contains(point) {
            return false;
        }

        let axes = target.gesture_axes();
        let mut handled = false;
        for (delta, behavior) in [(delta_y, self.config.wheel_y), (delta_x, self.config.wheel_x)] {
            if delta == 0.0 || behavior == WheelBehavior::None {
                continue;
            }
            let shift = delta / WHEEL_DELTA_UNITS;
            for axis in &axes {
                if behavior.zooms(axis.direction) && axis.zoomable {
                    self.wheel_zoom(target, axis, point, shift);
                    handled = true;
                } else if behavior.pans(axis.direction) && axis.pannable {
                    self.wheel_pan(target, axis, shift);
                    handled = true;
                }
            }
        }
        handled
    }

    fn wheel_zoom<T: ZoomTarget>(
        &self,
        target: &mut T,
        axis: &AxisGestureState,
        point: Point,
        shift: f64,
    ) {
        let (start, end) = (axis.start, axis.end);
        let span = end - start;
        let position = axis.relative_position(point, self.plot);
        let step = self.config.wheel_step;
        let new_start = start - step * span * shift * position;
        let new_end = end + step * span * shift * (1.0 - position);
        trace!(axis = %axis.id, new_start, new_end, "wheel zoom");
        if 1.0 / (new_end - new_start) < axis.max_zoom_factor {
            target.request_zoom(axis.id, new_start, new_end, self.config.wheel_duration_ms, None);
        } else {
            target.request_zoom(axis.id, start, end, self.config.wheel_duration_ms, None);
        }
    }

    fn wheel_pan<T: ZoomTarget>(&self, target: &mut T, axis: &AxisGestureState, shift: f64) {
        let sign = match axis.direction {
            AxisDirection::Horizontal => 1.0,
            AxisDirection::Vertical => -1.0,
        };
        let delta = sign * self.config.wheel_step * (axis.end - axis.start) * shift;
        let (start, end) = keep_inside(axis.start + delta, axis.end + delta);
        trace!(axis = %axis.id, start, end, "wheel pan");
        target.request_zoom(axis.id, start, end, self.config.wheel_duration_ms, None);
    }

    pub fn on_pointer_down<T: ZoomTarget>(&mut self, target: &mut T, pointer: PointerId, point: Point) {
        if !point.is_finite() {
            warn!(pointer = pointer.0, "ignoring non-finite pointer down");
            return;
        }
        if !self.plot.contains(point) {
            return;
        }
        self.pointers.insert(pointer, point);

        match self.pointers.len() {
            1 => self.begin_pan(target, pointer, point),
            _ if self.mode() != GestureMode::PinchActive => self.begin_pinch(target),
            _ => {}
        }
    }

    pub fn on_pointer_move<T: ZoomTarget>(&mut self, target: &mut T, pointer: PointerId, point: Point) {
        if !point.is_finite() {
            warn!(pointer = pointer.0, "ignoring non-finite pointer move");
            return;
        }
        let Some(slot) = self.pointers.get_mut(&pointer) else {
            return;
        };
        *slot = point;

        match &self.active {
            Some(ActiveGesture::Pan(pan)) if pan.pointer == pointer => {
                self.apply_pan(target, pan, point);
            }
            Some(ActiveGesture::Pinch(pinch)) if pinch.pointers.contains(&pointer) => {
                self.apply_pinch(target, pinch);
            }
            _ => {}
        }
    }

    pub fn on_pointer_up<T: ZoomTarget>(&mut self, target: &mut T, pointer: PointerId) {
        if self.pointers.shift_remove(&pointer).is_none() {
            return;
        }

        match self.active.take() {
            Some(ActiveGesture::Pan(pan)) if pan.pointer == pointer => {
                self.settle_overshoot(target, &pan.axes);
                debug!(mode = ?GestureMode::Idle, "pan gesture ended");
            }
            Some(ActiveGesture::Pinch(pinch)) if pinch.pointers.contains(&pointer) => {
                if self.pointers.len() >= 2 {
                    self.begin_pinch(target);
                } else if let Some((remaining, point)) =
                    self.pointers.first().map(|(id, point)| (*id, *point))
                {
                    self.begin_pan(target, remaining, point);
                } else {
                    debug!(mode = ?GestureMode::Idle, "pinch gesture ended");
                }
            }
            other => self.active = other,
        }
    }

    /// Drops every pointer and returns to `Idle` without settling.
    pub fn cancel(&mut self) {
        self.pointers.clear();
        if self.active.take().is_some() {
            debug!(mode = ?GestureMode::Idle, "gesture cancelled");
        }
    }

    fn begin_pan<T: ZoomTarget>(&mut self, target: &T, pointer: PointerId, point: Point) {
        let axes: SmallVec<[AxisAnchor; 4]> = target
            .gesture_axes()
            .iter()
            .filter(|axis| axis.pannable && self.config.pans(axis.direction))
            .map(AxisAnchor::from_state)
            .collect();
        self.active = Some(ActiveGesture::Pan(PanGesture {
            pointer,
            down: point,
            axes,
        }));
        debug!(mode = ?GestureMode::PanActive, pointer = pointer.0, "pan gesture started");
    }

    fn begin_pinch<T: ZoomTarget>(&mut self, target: &T) {
        let mut tracked = self.pointers.iter().take(2).map(|(id, point)| (*id, *point));
        let (Some(first), Some(second)) = (tracked.next(), tracked.next()) else {
            return;
        };
        let axes: SmallVec<[AxisAnchor; 4]> = target
            .gesture_axes()
            .iter()
            .filter(|axis| axis.zoomable && self.config.pinches(axis.direction))
            .map(AxisAnchor::from_state)
            .collect();
        self.active = Some(ActiveGesture::Pinch(PinchGesture {
            pointers: [first.0, second.0],
            down: [first.1, second.1],
            axes,
        }));
        debug!(mode = ?GestureMode::PinchActive, "pinch gesture started");
    }

    fn apply_pan<T: ZoomTarget>(&self, target: &mut T, pan: &PanGesture, point: Point) {
        for axis in &pan.axes {
            let span = axis.end - axis.start;
            let mut delta = match axis.direction {
                AxisDirection::Horizontal => span * (pan.down.x - point.x) / self.plot.width,
                AxisDirection::Vertical => span * (point.y - pan.down.y) / self.plot.height,
            };
            if axis.inverted {
                delta = -delta;
            }
            let (start, end) = (axis.start + delta, axis.end + delta);
            if end - start < 1.0 + 2.0 * axis.max_deviation {
                target.set_pan_position(axis.id, start, end);
            }
        }
    }

    fn apply_pinch<T: ZoomTarget>(&self, target: &mut T, pinch: &PinchGesture) {
        let (Some(current_0), Some(current_1)) = (
            self.pointers.get(&pinch.pointers[0]).copied(),
            self.pointers.get(&pinch.pointers[1]).copied(),
        ) else {
            return;
        };

        for axis in &pinch.axes {
            let (start, end) = pinch_window(
                axis.start,
                axis.end,
                [
                    axis.relative(pinch.down[0], self.plot),
                    axis.relative(pinch.down[1], self.plot),
                ],
                [
                    axis.relative(current_0, self.plot),
                    axis.relative(current_1, self.plot),
                ],
            );
            trace!(axis = %axis.id, start, end, "pinch zoom");
            target.request_zoom(axis.id, start, end, 0.0, None);
        }
    }

    fn settle_overshoot<T: ZoomTarget>(&self, target: &mut T, anchors: &[AxisAnchor]) {
        let axes = target.gesture_axes();
        for anchor in anchors {
            let Some(axis) = axes.iter().find(|axis| axis.id == anchor.id) else {
                continue;
            };
            let (start, end) = shift_within_deviation(axis.start, axis.end, axis.max_deviation);
            if start != axis.start || end != axis.end {
                debug!(axis = %axis.id, start, end, "settling overshot pan");
                target.request_zoom(axis.id, start, end, self.config.settle_duration_ms, None);
            }
        }
    }
}

/// Window keeping both fingers over the axis positions they touched.
///
/// `down` and `current` are window-relative finger positions; `start`/`end`
/// is the window when the fingers went down.
#[must_use]
pub fn pinch_window(start: f64, end: f64, down: [f64; 2], current: [f64; 2]) -> (f64, f64) {
    let (down, current) = if down[0] <= down[1] {
        (down, current)
    } else {
        ([down[1], down[0]], [current[1], current[0]])
    };
    let span = end - start;
    let down_0 = start + down[0] * span;
    let down_1 = start + down[1] * span;
    let move_0 = start + current[0] * span;
    let move_1 = start + current[1] * span;

    let scale = (down_1 - down_0).max(MIN_PINCH_DISTANCE) / (move_1 - move_0).max(MIN_PINCH_DISTANCE);
    let new_start = start * scale + down_0 - move_0 * scale;
    let new_end = end * scale + down_1 - move_1 * scale;
    (new_start, new_end)
}

/// Shifts `[start, end]` back inside `[0, 1]` keeping its span.
fn keep_inside(start: f64, end: f64) -> (f64, f64) {
    let span = end - start;
    let (mut start, mut end) = (start, end);
    if start < 0.0 {
        start = 0.0;
        end = span;
    }
    if end > 1.0 {
        end = 1.0;
        start = end - span;
    }
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::{keep_inside, pinch_window};

    #[test]
    fn pinch_spread_zooms_in_around_fingers() {
        let (start, end) = pinch_window(0.0, 1.0, [0.2, 0.8], [0.1, 0.9]);
        assert!((start - 0.125).abs() <= 1e-12);
        assert!((end - 0.875).abs() <= 1e-12);
    }

    #[test]
    fn wheel_pan_window_stays_inside_unit_range() {
        assert_eq!(keep_inside(-0.25, 0.25), (0.0, 0.5));
        assert_eq!(keep_inside(0.75, 1.25), (0.5, 1.0));
    }
}
