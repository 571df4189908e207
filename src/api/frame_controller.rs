use indexmap::IndexSet;
use serde::Serialize;
use tracing::trace;

use crate::core::{AxisId, AxisKind, ExtremesChange, Selection, SeriesId, ZoomHandle};
use crate::error::{AxisError, AxisResult};

use super::AxisEngine;
use super::extremes_coordinator::ExtremesCoordinator;

/// Observable outcome of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineEvent {
    ExtremesChanged {
        axis: AxisId,
        change: ExtremesChange,
    },
    SelectionChanged {
        axis: AxisId,
        selection: Option<Selection>,
    },
    /// Deferred notification after a zoom came to rest.
    ZoomSettled { axis: AxisId, start: f64, end: f64 },
    AnimationFinished { axis: AxisId, handle: ZoomHandle },
    SeriesVisibilityChanged { series: SeriesId, visible: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub now_ms: f64,
    pub events: Vec<EngineEvent>,
}

impl FrameReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn extremes_changes(&self) -> impl Iterator<Item = (AxisId, &ExtremesChange)> + '_ {
        self.events.iter().filter_map(|event| match event {
            EngineEvent::ExtremesChanged { axis, change } => Some((*axis, change)),
            _ => None,
        })
    }

    #[must_use]
    pub fn settled(&self, axis: AxisId) -> bool {
        self.events.iter().any(|event| {
            matches!(event, EngineEvent::ZoomSettled { axis: settled, .. } if *settled == axis)
        })
    }
}

impl AxisEngine {
    /// Runs one frame at `now_ms`.
    ///
    /// Order: visibility animations, stacks and series extents, axis
    /// extremes and zoom limits, finals and viewport animations with
    /// selections, auto-zoom, settle notifications.
    pub fn tick(&mut self, now_ms: f64) -> AxisResult<FrameReport> {
        if !now_ms.is_finite() {
            return Err(AxisError::InvalidData(
                "frame time must be finite".to_owned(),
            ));
        }
        self.clock_ms = self.clock_ms.max(now_ms);
        let now = self.clock_ms;
        let mut events = std::mem::take(&mut self.pending_events);

        for series in self.series.values_mut() {
            let tick = series.tick_visibility(now);
            if tick.weight_changed || tick.finished {
                self.dirty_series.insert(series.id());
            }
            if tick.finished {
                events.push(EngineEvent::SeriesVisibilityChanged {
                    series: series.id(),
                    visible: !series.is_hidden(),
                });
            }
        }

        ExtremesCoordinator::refresh_series(self);
        ExtremesCoordinator::refresh_axes(self, now, &mut events);

        let mut settled: Vec<(AxisId, f64, f64)> = Vec::new();
        let mut moved_base_axes: IndexSet<AxisId> = IndexSet::new();
        for (id, node) in &mut self.axes {
            node.scale.tick_finals(now);
            let viewport_tick = node.viewport.tick(now);
            if let Some(handle) = viewport_tick.finished {
                events.push(EngineEvent::AnimationFinished { axis: *id, handle });
            }
            if viewport_tick.settled {
                settled.push((*id, node.viewport.start(), node.viewport.end()));
            }
            let change = node
                .scale
                .update_selection(node.viewport.start(), node.viewport.end());
            if change.is_changed() {
                events.push(EngineEvent::SelectionChanged {
                    axis: *id,
                    selection: change.current,
                });
                if node.scale.kind() == AxisKind::Category || !node.scale.config().auto_zoom {
                    moved_base_axes.insert(*id);
                }
            }
        }

        ExtremesCoordinator::auto_zoom(self, &moved_base_axes);

        events.extend(
            settled
                .into_iter()
                .map(|(axis, start, end)| EngineEvent::ZoomSettled { axis, start, end }),
        );
        trace!(now_ms = now, events = events.len(), "frame complete");
        Ok(FrameReport {
            now_ms: now,
            events,
        })
    }
}
