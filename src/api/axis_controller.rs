use tracing::debug;

use crate::core::{
    AxisConfig, AxisId, AxisRange, AxisScale, ListChange, PlotSize, Viewport, ZoomHandle,
    ZoomOutcome, ZoomPriority,
};
use crate::error::{AxisError, AxisResult};

use super::{AxisEngine, AxisNode};

impl AxisEngine {
    /// Registers an axis and returns its id.
    pub fn add_axis(&mut self, config: AxisConfig) -> AxisResult<AxisId> {
        let id = AxisId::new(self.next_axis);
        self.validate_sync_target(id, &config)?;
        let node = AxisNode {
            scale: AxisScale::new(id, config)?,
            viewport: Viewport::new(config.viewport)?,
            ranges: Default::default(),
        };
        self.next_axis += 1;
        self.axes.insert(id, node);
        self.dirty_axes.insert(id);
        debug!(axis = %id, kind = ?config.kind, "axis added");
        Ok(id)
    }

    /// Replaces an axis configuration, keeping its viewport window.
    pub fn set_axis_config(&mut self, id: AxisId, config: AxisConfig) -> AxisResult<()> {
        self.validate_sync_target(id, &config)?;
        let scale = AxisScale::new(id, config)?;
        let mut viewport = Viewport::new(config.viewport)?;
        let node = self.axis_node_mut(id)?;
        viewport.set_direct(node.viewport.start(), node.viewport.end());
        node.scale = scale;
        node.viewport = viewport;
        self.dirty_axes.insert(id);
        Ok(())
    }

    pub fn axis(&self, id: AxisId) -> AxisResult<&AxisScale> {
        self.axes
            .get(&id)
            .map(|node| &node.scale)
            .ok_or(AxisError::UnknownAxis(id))
    }

    pub fn viewport(&self, id: AxisId) -> AxisResult<&Viewport> {
        self.axes
            .get(&id)
            .map(|node| &node.viewport)
            .ok_or(AxisError::UnknownAxis(id))
    }

    pub fn axis_ids(&self) -> impl Iterator<Item = AxisId> + '_ {
        self.axes.keys().copied()
    }

    #[must_use]
    pub fn plot_size(&self) -> PlotSize {
        self.config.plot
    }

    /// Resizes the plot; every axis recomputes its grid on the next frame.
    pub fn set_plot_size(&mut self, plot: PlotSize) -> AxisResult<()> {
        self.gestures.set_plot(plot)?;
        self.config.plot = plot;
        self.dirty_axes.extend(self.axes.keys().copied());
        Ok(())
    }

    /// Zooms the axis window to `[start, end]` (relative positions).
    pub fn zoom(
        &mut self,
        id: AxisId,
        start: f64,
        end: f64,
        duration_ms: f64,
        priority: Option<ZoomPriority>,
    ) -> AxisResult<ZoomOutcome> {
        let now = self.clock_ms;
        let node = self.axes.get_mut(&id).ok_or(AxisError::UnknownAxis(id))?;
        Ok(node
            .viewport
            .zoom(start, end, duration_ms, priority, now, &mut self.ids))
    }

    /// Zooms so that `[start_value, end_value]` fills the axis window.
    pub fn zoom_to_values(
        &mut self,
        id: AxisId,
        start_value: f64,
        end_value: f64,
        duration_ms: f64,
    ) -> AxisResult<ZoomOutcome> {
        let scale = self.axis(id)?;
        let (Some(start), Some(end)) = (
            scale.value_to_position(start_value),
            scale.value_to_position(end_value),
        ) else {
            return Ok(ZoomOutcome::Unchanged);
        };
        self.zoom(id, start, end, duration_ms, None)
    }

    pub fn zoom_out(&mut self, id: AxisId, duration_ms: f64) -> AxisResult<ZoomOutcome> {
        let now = self.clock_ms;
        let node = self.axes.get_mut(&id).ok_or(AxisError::UnknownAxis(id))?;
        Ok(node.viewport.zoom_out(duration_ms, now, &mut self.ids))
    }

    /// Stops the zoom animation behind `handle`; the window stays where it is.
    pub fn cancel_zoom(&mut self, id: AxisId, handle: ZoomHandle) -> AxisResult<bool> {
        Ok(self.axis_node_mut(id)?.viewport.cancel(handle))
    }

    pub fn stop_zoom_animation(&mut self, id: AxisId) -> AxisResult<()> {
        self.axis_node_mut(id)?.viewport.stop_animation();
        Ok(())
    }

    pub fn is_zoom_running(&self, id: AxisId, handle: ZoomHandle) -> AxisResult<bool> {
        Ok(self.viewport(id)?.is_running(handle))
    }

    pub fn value_to_position(&self, id: AxisId, value: f64) -> AxisResult<Option<f64>> {
        Ok(self.axis(id)?.value_to_position(value))
    }

    pub fn position_to_value(&self, id: AxisId, position: f64) -> AxisResult<Option<f64>> {
        Ok(self.axis(id)?.position_to_value(position))
    }

    /// Pixel coordinate of `value` inside the current axis window.
    pub fn value_to_coordinate(&self, id: AxisId, value: f64) -> AxisResult<Option<f64>> {
        let node = self.axes.get(&id).ok_or(AxisError::UnknownAxis(id))?;
        Ok(node.scale.value_to_position(value).map(|position| {
            node.scale
                .position_to_coordinate(node.viewport.to_global(position))
        }))
    }

    pub fn base_value(&self, id: AxisId) -> AxisResult<Option<f64>> {
        Ok(self.axis(id)?.base_value())
    }

    pub fn ranges(&self, id: AxisId) -> AxisResult<&[AxisRange]> {
        self.axes
            .get(&id)
            .map(|node| node.ranges.as_slice())
            .ok_or(AxisError::UnknownAxis(id))
    }

    /// Mutates the axis range list; ranges affecting extremes dirty the axis.
    pub fn apply_range_change(
        &mut self,
        id: AxisId,
        change: ListChange<AxisRange>,
    ) -> AxisResult<()> {
        if self.axis_node_mut(id)?.ranges.apply(change)? {
            self.dirty_axes.insert(id);
        }
        Ok(())
    }

    pub(super) fn axis_node_mut(&mut self, id: AxisId) -> AxisResult<&mut AxisNode> {
        self.axes.get_mut(&id).ok_or(AxisError::UnknownAxis(id))
    }

    fn validate_sync_target(&self, id: AxisId, config: &AxisConfig) -> AxisResult<()> {
        let Some(mut cursor) = config.sync_with else {
            return Ok(());
        };
        for _ in 0..=self.axes.len() {
            if cursor == id {
                return Err(AxisError::InvalidConfig(format!(
                    "{id} cannot sync with itself through {cursor}"
                )));
            }
            let node = self
                .axes
                .get(&cursor)
                .ok_or(AxisError::UnknownAxis(cursor))?;
            match node.scale.config().sync_with {
                Some(next) => cursor = next,
                None => return Ok(()),
            }
        }
        Err(AxisError::InvalidConfig(format!(
            "sync chain of {id} does not terminate"
        )))
    }
}
