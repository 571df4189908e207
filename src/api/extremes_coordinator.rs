use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{
    AxisId, AxisKind, ExtremesInput, ItemWindow, SeriesId, ZoomLimits, series::compute_extent,
};

use super::{AxisEngine, EngineEvent};

pub(super) struct ExtremesCoordinator;

impl ExtremesCoordinator {
    /// Re-resolves stacks touched by dirty series and refreshes the extents
    /// of every series reachable through the stack graph.
    pub(super) fn refresh_series(engine: &mut AxisEngine) {
        if engine.dirty_series.is_empty() {
            return;
        }
        let dirty: IndexSet<SeriesId> = std::mem::take(&mut engine.dirty_series);

        let mut resolved: SmallVec<[SeriesId; 8]> = SmallVec::new();
        let ids: Vec<SeriesId> = engine.series.keys().copied().collect();
        for id in ids {
            let Some(series) = engine.series.get(&id) else {
                continue;
            };
            let config = series.config();
            let touched = dirty.iter().any(|dirty_id| {
                engine
                    .series
                    .get(dirty_id)
                    .is_some_and(|other| other.config().shares_axes_with(config))
            });
            if config.stacked && touched {
                engine.stacks.resolve(&engine.series, id);
                resolved.push(id);
            }
        }

        let affected = engine
            .stacks
            .dependents_closure(dirty.iter().copied().chain(resolved.iter().copied()));
        for id in &affected {
            let Some(series) = engine.series.get(id) else {
                continue;
            };
            let config = series.config();
            let base = engine
                .axes
                .get(&config.value_axis())
                .map(|node| {
                    node.scale
                        .base_value()
                        .unwrap_or(node.scale.config().base_value)
                })
                .unwrap_or_default();
            let extent = compute_extent(&engine.series, &engine.stacks, *id, base, ItemWindow::All);
            engine.extents.insert(*id, extent);
            engine.dirty_axes.extend([config.x_axis, config.y_axis]);
        }
        debug!(
            dirty = dirty.len(),
            restacked = resolved.len(),
            affected = affected.len(),
            "series extents refreshed"
        );
    }

    /// Recomputes dirty axes, sync targets before their followers.
    pub(super) fn refresh_axes(engine: &mut AxisEngine, now_ms: f64, events: &mut Vec<EngineEvent>) {
        if engine.dirty_axes.is_empty() {
            return;
        }
        let mut dirty: IndexSet<AxisId> = std::mem::take(&mut engine.dirty_axes);
        loop {
            let followers: Vec<AxisId> = engine
                .axes
                .iter()
                .filter(|(id, node)| {
                    !dirty.contains(*id)
                        && node
                            .scale
                            .config()
                            .sync_with
                            .is_some_and(|target| dirty.contains(&target))
                })
                .map(|(id, _)| *id)
                .collect();
            if followers.is_empty() {
                break;
            }
            dirty.extend(followers);
        }

        let mut ordered: Vec<(usize, AxisId)> = dirty
            .iter()
            .map(|id| (Self::sync_depth(engine, *id), *id))
            .collect();
        ordered.sort_by_key(|(depth, _)| *depth);

        for (_, id) in ordered {
            let Some(input) = Self::extremes_input(engine, id) else {
                continue;
            };
            let Some(node) = engine.axes.get_mut(&id) else {
                continue;
            };
            let change = node.scale.recompute_extremes(&input, now_ms, &mut engine.ids);
            let limits = ZoomLimits::derive(node.viewport.config(), node.scale.zoom_units());
            node.viewport.set_limits(limits);
            if change.is_changed() {
                events.push(EngineEvent::ExtremesChanged { axis: id, change });
            }
        }
    }

    fn sync_depth(engine: &AxisEngine, id: AxisId) -> usize {
        let mut depth = 0;
        let mut cursor = engine
            .axes
            .get(&id)
            .and_then(|node| node.scale.config().sync_with);
        while let Some(target) = cursor {
            depth += 1;
            if depth > engine.axes.len() {
                break;
            }
            cursor = engine
                .axes
                .get(&target)
                .and_then(|node| node.scale.config().sync_with);
        }
        depth
    }

    fn extremes_input(engine: &AxisEngine, id: AxisId) -> Option<ExtremesInput> {
        let node = engine.axes.get(&id)?;
        let mut input = ExtremesInput {
            ranges: node.ranges.extent(),
            length_px: engine.config.plot.length(node.scale.config().direction),
            sync_target: node
                .scale
                .config()
                .sync_with
                .and_then(|target| engine.axes.get(&target))
                .and_then(|target| target.scale.extremes())
                .map(|extremes| extremes.finals()),
            ..ExtremesInput::default()
        };

        for series in engine.series.values() {
            let config = series.config();
            let extent = engine.extents.get(&series.id()).copied().unwrap_or_default();
            let contribution = if config.value_axis() == id {
                extent.value
            } else if config.base_axis() == id {
                input.item_count = input.item_count.max(series.items().len());
                extent.base
            } else {
                None
            };
            if let Some((low, high)) = contribution {
                input.series = Some(match input.series {
                    None => (low, high),
                    Some((min, max)) => (min.min(low), max.max(high)),
                });
            }
        }
        trace!(axis = %id, series = ?input.series, ranges = ?input.ranges, "extremes input collected");
        Some(input)
    }

    /// Zooms auto-zoom value axes onto the items visible through the base
    /// axes whose selection moved this frame.
    pub(super) fn auto_zoom(engine: &mut AxisEngine, moved_base_axes: &IndexSet<AxisId>) {
        if moved_base_axes.is_empty() {
            return;
        }
        let candidates: Vec<AxisId> = engine
            .axes
            .iter()
            .filter(|(_, node)| node.scale.config().auto_zoom)
            .map(|(id, _)| *id)
            .collect();

        for value_axis in candidates {
            let mut visible: Option<(f64, f64)> = None;
            let mut driven = false;
            for series in engine.series.values() {
                let config = series.config();
                if config.value_axis() != value_axis || !moved_base_axes.contains(&config.base_axis())
                {
                    continue;
                }
                let Some(base_node) = engine.axes.get(&config.base_axis()) else {
                    continue;
                };
                let Some(selection) = base_node.scale.selection() else {
                    continue;
                };
                driven = true;
                let window = match base_node.scale.kind() {
                    AxisKind::Category => ItemWindow::Indices {
                        start: selection.min.max(0.0).floor() as usize,
                        end: selection.max.max(0.0).ceil() as usize,
                    },
                    AxisKind::Value => ItemWindow::Base {
                        min: selection.min,
                        max: selection.max,
                    },
                };
                let base = engine
                    .axes
                    .get(&value_axis)
                    .and_then(|node| node.scale.base_value())
                    .unwrap_or_default();
                let extent =
                    compute_extent(&engine.series, &engine.stacks, series.id(), base, window);
                if let Some((low, high)) = extent.value {
                    visible = Some(match visible {
                        None => (low, high),
                        Some((min, max)) => (min.min(low), max.max(high)),
                    });
                }
            }
            if !driven {
                continue;
            }

            let now = engine.clock_ms;
            let duration = engine.config.auto_zoom_duration_ms;
            let Some(node) = engine.axes.get_mut(&value_axis) else {
                continue;
            };
            let Some((start, end)) = node.scale.recompute_selection_extremes(visible) else {
                continue;
            };
            let outcome = node
                .viewport
                .zoom(start, end, duration, None, now, &mut engine.ids);
            debug!(axis = %value_axis, start, end, ?outcome, "auto-zoom applied");
        }
    }
}
