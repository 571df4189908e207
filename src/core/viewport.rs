use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::animation::{Animation, AnimationId, AnimationIds, AnimationStatus, Easing};
use crate::core::primitives::approx_equal;
use crate::error::{AxisError, AxisResult};

/// Zoom and overscroll tuning of one axis viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Overscroll allowance beyond `[0, 1]`, scaled by `min(1, span)`.
    #[serde(default = "default_max_deviation")]
    pub max_deviation: f64,
    /// Zoom-in ceiling used when `min_zoom_count` is not set.
    #[serde(default = "default_max_zoom_factor")]
    pub max_zoom_factor: f64,
    /// Fewest zoom units (steps or categories) that must stay visible.
    #[serde(default)]
    pub min_zoom_count: Option<f64>,
    /// Most zoom units that may be visible at once.
    #[serde(default)]
    pub max_zoom_count: Option<f64>,
    #[serde(default)]
    pub easing: Easing,
}

fn default_max_deviation() -> f64 {
    0.5
}

fn default_max_zoom_factor() -> f64 {
    100.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            max_deviation: default_max_deviation(),
            max_zoom_factor: default_max_zoom_factor(),
            min_zoom_count: None,
            max_zoom_count: None,
            easing: Easing::default(),
        }
    }
}

impl ViewportConfig {
    #[must_use]
    pub fn with_max_deviation(mut self, max_deviation: f64) -> Self {
        self.max_deviation = max_deviation;
        self
    }

    #[must_use]
    pub fn with_max_zoom_factor(mut self, max_zoom_factor: f64) -> Self {
        self.max_zoom_factor = max_zoom_factor;
        self
    }

    #[must_use]
    pub fn with_zoom_counts(mut self, min_zoom_count: Option<f64>, max_zoom_count: Option<f64>) -> Self {
        self.min_zoom_count = min_zoom_count;
        self.max_zoom_count = max_zoom_count;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn validate(self) -> AxisResult<Self> {
        if !self.max_deviation.is_finite() || self.max_deviation < 0.0 {
            return Err(AxisError::InvalidConfig(
                "viewport max deviation must be finite and >= 0".to_owned(),
            ));
        }
        if !self.max_zoom_factor.is_finite() || self.max_zoom_factor < 1.0 {
            return Err(AxisError::InvalidConfig(
                "viewport max zoom factor must be finite and >= 1".to_owned(),
            ));
        }
        for count in [self.min_zoom_count, self.max_zoom_count].into_iter().flatten() {
            if !count.is_finite() || count <= 0.0 {
                return Err(AxisError::InvalidConfig(
                    "viewport zoom counts must be finite and > 0".to_owned(),
                ));
            }
        }
        Ok(self)
    }
}

/// Edge kept fixed when a zoom-factor bound forces the span to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomPriority {
    Start,
    End,
}

/// Zoom-factor bounds derived from the axis' current zoom units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub max_factor: f64,
    pub min_factor: Option<f64>,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            max_factor: default_max_zoom_factor(),
            min_factor: None,
        }
    }
}

impl ZoomLimits {
    /// `zoom_units` is the number of steps (value axes) or categories
    /// spanning the full domain.
    #[must_use]
    pub fn derive(config: ViewportConfig, zoom_units: f64) -> Self {
        let units = if zoom_units.is_finite() && zoom_units > 0.0 {
            zoom_units
        } else {
            1.0
        };
        let max_factor = match config.min_zoom_count {
            Some(count) if count > 0.0 => units / count,
            _ => config.max_zoom_factor,
        };
        let min_factor = config
            .max_zoom_count
            .filter(|count| *count > 0.0)
            .map(|count| units / count);
        Self {
            max_factor: max_factor.max(1.0),
            min_factor,
        }
    }
}

/// Overscroll allowance of a `span` wide window.
#[must_use]
pub fn deviation_for(max_deviation: f64, span: f64) -> f64 {
    max_deviation * span.min(1.0)
}

/// Moves `[start, end]` inside `[-deviation, 1 + deviation]` keeping its span.
///
/// A window wider than the bounds is cut down to them.
#[must_use]
pub fn shift_within_deviation(start: f64, end: f64, max_deviation: f64) -> (f64, f64) {
    let span = end - start;
    let deviation = deviation_for(max_deviation, span);
    let (low, high) = (-deviation, 1.0 + deviation);
    if span >= high - low {
        (low, high)
    } else if start < low {
        (low, low + span)
    } else if end > high {
        (high - span, high)
    } else {
        (start, end)
    }
}

/// Animation pair started by an animated zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomHandle {
    pub start: AnimationId,
    pub end: AnimationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomOutcome {
    /// Request matched the current or in-flight state.
    Unchanged,
    /// Applied synchronously; a settle notification follows next frame.
    Applied,
    Animating(ZoomHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportState {
    AtRest,
    Animating,
}

/// What one frame did to a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportTick {
    pub moved: bool,
    pub finished: Option<ZoomHandle>,
    pub settled: bool,
}

/// Visible fraction `[start, end]` of an axis domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    config: ViewportConfig,
    start: f64,
    end: f64,
    limits: ZoomLimits,
    start_animation: Option<Animation>,
    end_animation: Option<Animation>,
    pending_settle: bool,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> AxisResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            config,
            start: 0.0,
            end: 1.0,
            limits: ZoomLimits {
                max_factor: config.max_zoom_factor,
                min_factor: None,
            },
            start_animation: None,
            end_animation: None,
            pending_settle: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> ViewportConfig {
        self.config
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: ZoomLimits) {
        self.limits = limits;
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        if self.start_animation.is_some() || self.end_animation.is_some() {
            ViewportState::Animating
        } else {
            ViewportState::AtRest
        }
    }

    /// Overscroll allowance for a span.
    #[must_use]
    pub fn deviation(&self, span: f64) -> f64 {
        deviation_for(self.config.max_deviation, span)
    }

    /// Final `(start, end)` a zoom request resolves to, without applying it.
    #[must_use]
    pub fn constrain(&self, start: f64, end: f64, priority: Option<ZoomPriority>) -> (f64, f64) {
        let (mut start, mut end) = if start > end { (end, start) } else { (start, end) };
        let deviation = self.deviation(end - start);
        start = start.clamp(-deviation, 1.0 + deviation);
        end = end.clamp(-deviation, 1.0 + deviation);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        let priority = priority.unwrap_or_else(|| self.infer_priority(start, end));

        if let Some(min_factor) = self.limits.min_factor {
            if min_factor > 0.0 && 1.0 / (end - start) < min_factor {
                let span = 1.0 / min_factor;
                match priority {
                    ZoomPriority::Start => end = start + span,
                    ZoomPriority::End => start = end - span,
                }
            }
        }

        let max_factor = self.limits.max_factor;
        if end - start <= 0.0 || 1.0 / (end - start) > max_factor {
            let span = 1.0 / max_factor;
            match priority {
                ZoomPriority::Start => end = start + span,
                ZoomPriority::End => start = end - span,
            }
        }

        shift_within_deviation(start, end, self.config.max_deviation)
    }

    fn infer_priority(&self, start: f64, end: f64) -> ZoomPriority {
        let mut priority = ZoomPriority::End;
        if end == 1.0 && start != 0.0 {
            priority = if start < self.start {
                ZoomPriority::Start
            } else {
                ZoomPriority::End
            };
        }
        if start == 0.0 && end != 1.0 {
            priority = if end > self.end {
                ZoomPriority::End
            } else {
                ZoomPriority::Start
            };
        }
        priority
    }

    /// Zooms to `[start, end]`; animated when `duration_ms > 0`.
    pub fn zoom(
        &mut self,
        start: f64,
        end: f64,
        duration_ms: f64,
        priority: Option<ZoomPriority>,
        now_ms: f64,
        ids: &mut AnimationIds,
    ) -> ZoomOutcome {
        if !start.is_finite() || !end.is_finite() {
            warn!(start, end, "ignoring non-finite zoom request");
            return ZoomOutcome::Unchanged;
        }

        let (start, end) = self.constrain(start, end, priority);
        let start_reached = match self.start_animation {
            Some(animation) => approx_equal(animation.to, start),
            None => approx_equal(self.start, start),
        };
        let end_reached = match self.end_animation {
            Some(animation) => approx_equal(animation.to, end),
            None => approx_equal(self.end, end),
        };
        if start_reached && end_reached {
            trace!(start, end, "zoom request is a no-op");
            return ZoomOutcome::Unchanged;
        }

        if duration_ms > 0.0 {
            let handle = ZoomHandle {
                start: ids.allocate(),
                end: ids.allocate(),
            };
            self.start_animation = Some(
                Animation::new(handle.start, self.start, start, now_ms, duration_ms)
                    .with_easing(self.config.easing),
            );
            self.end_animation = Some(
                Animation::new(handle.end, self.end, end, now_ms, duration_ms)
                    .with_easing(self.config.easing),
            );
            debug!(start, end, duration_ms, "zoom animating");
            ZoomOutcome::Animating(handle)
        } else {
            self.start = start;
            self.end = end;
            self.start_animation = None;
            self.end_animation = None;
            self.pending_settle = true;
            debug!(start, end, "zoom applied");
            ZoomOutcome::Applied
        }
    }

    pub fn zoom_out(&mut self, duration_ms: f64, now_ms: f64, ids: &mut AnimationIds) -> ZoomOutcome {
        self.zoom(0.0, 1.0, duration_ms, None, now_ms, ids)
    }

    /// Sets the window directly, bypassing constraints other than finiteness.
    pub fn set_direct(&mut self, start: f64, end: f64) {
        if !start.is_finite() || !end.is_finite() {
            warn!(start, end, "ignoring non-finite viewport update");
            return;
        }
        self.stop_animation();
        self.start = start;
        self.end = end;
    }

    /// Stops in-flight animations, keeping the interpolated window.
    pub fn stop_animation(&mut self) {
        self.start_animation = None;
        self.end_animation = None;
    }

    /// Stops the animation started for `handle`, if it is still in flight.
    pub fn cancel(&mut self, handle: ZoomHandle) -> bool {
        let mut cancelled = false;
        if self.start_animation.is_some_and(|animation| animation.id == handle.start) {
            self.start_animation = None;
            cancelled = true;
        }
        if self.end_animation.is_some_and(|animation| animation.id == handle.end) {
            self.end_animation = None;
            cancelled = true;
        }
        if cancelled {
            debug!(start = self.start, end = self.end, "zoom animation cancelled");
        }
        cancelled
    }

    #[must_use]
    pub fn is_running(&self, handle: ZoomHandle) -> bool {
        self.start_animation.is_some_and(|animation| animation.id == handle.start)
            || self.end_animation.is_some_and(|animation| animation.id == handle.end)
    }

    /// Advances animations to `now_ms` and drains the pending settle flag.
    pub fn tick(&mut self, now_ms: f64) -> ViewportTick {
        let mut tick = ViewportTick::default();
        let handle = match (self.start_animation, self.end_animation) {
            (Some(start), Some(end)) => Some(ZoomHandle {
                start: start.id,
                end: end.id,
            }),
            _ => None,
        };

        let mut finished_all = handle.is_some();
        if let Some(animation) = self.start_animation {
            let (value, status) = animation.sample(now_ms);
            tick.moved |= value != self.start;
            self.start = value;
            if status == AnimationStatus::Finished {
                self.start_animation = None;
            } else {
                finished_all = false;
            }
        }
        if let Some(animation) = self.end_animation {
            let (value, status) = animation.sample(now_ms);
            tick.moved |= value != self.end;
            self.end = value;
            if status == AnimationStatus::Finished {
                self.end_animation = None;
            } else {
                finished_all = false;
            }
        }
        if finished_all {
            tick.finished = handle;
            tick.settled = true;
        }

        if self.pending_settle {
            self.pending_settle = false;
            tick.settled = true;
        }
        tick
    }

    /// Position within the visible window; 0 at `start`, 1 at `end`.
    #[must_use]
    pub fn to_global(&self, position: f64) -> f64 {
        (position - self.start) / (self.end - self.start)
    }

}

#[cfg(test)]
mod tests {
    use super::{Viewport, ViewportConfig, ZoomLimits, shift_within_deviation};

    #[test]
    fn limits_prefer_min_zoom_count_over_factor() {
        let config = ViewportConfig::default().with_zoom_counts(Some(5.0), Some(20.0));
        let limits = ZoomLimits::derive(config, 50.0);
        assert_eq!(limits.max_factor, 10.0);
        assert_eq!(limits.min_factor, Some(2.5));

        let fallback = ZoomLimits::derive(ViewportConfig::default(), 50.0);
        assert_eq!(fallback.max_factor, 100.0);
        assert_eq!(fallback.min_factor, None);
    }

    #[test]
    fn global_positions_map_through_window() {
        let mut viewport = Viewport::new(ViewportConfig::default()).expect("viewport");
        viewport.set_direct(0.25, 0.75);
        assert_eq!(viewport.to_global(0.5), 0.5);
        assert_eq!(viewport.to_global(0.75), 1.0);
    }

    #[test]
    fn shifting_keeps_span_unless_wider_than_bounds() {
        assert_eq!(shift_within_deviation(-0.5, 0.0, 0.25), (-0.125, 0.375));
        assert_eq!(shift_within_deviation(0.75, 1.25, 0.0), (0.5, 1.0));
        assert_eq!(shift_within_deviation(0.25, 0.625, 0.25), (0.25, 0.625));
        assert_eq!(shift_within_deviation(-1.0, 1.5, 0.5), (-0.5, 1.5));
    }
}
