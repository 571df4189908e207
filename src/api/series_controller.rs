use tracing::debug;

use crate::core::{AnimationId, DataItem, Series, SeriesConfig, SeriesExtent, SeriesId};
use crate::error::{AxisError, AxisResult};

use super::{AxisEngine, EngineEvent};

impl AxisEngine {
    /// Registers a series; registration order is stacking order.
    pub fn add_series(&mut self, config: SeriesConfig) -> AxisResult<SeriesId> {
        for axis in [config.x_axis, config.y_axis] {
            if !self.axes.contains_key(&axis) {
                return Err(AxisError::UnknownAxis(axis));
            }
        }
        let id = SeriesId::new(self.next_series);
        let series = Series::new(id, config)?;
        self.next_series += 1;
        self.series.insert(id, series);
        self.stacks.insert(id);
        self.dirty_series.insert(id);
        debug!(series = %id, kind = ?config.kind, stacked = config.stacked, "series added");
        Ok(id)
    }

    pub fn remove_series(&mut self, id: SeriesId) -> AxisResult<()> {
        let series = self
            .series
            .shift_remove(&id)
            .ok_or(AxisError::UnknownSeries(id))?;
        let dependents = self.stacks.remove(id);
        self.extents.shift_remove(&id);
        self.dirty_series.shift_remove(&id);
        self.dirty_series.extend(dependents.iter().copied());
        self.dirty_axes
            .extend([series.config().x_axis, series.config().y_axis]);
        debug!(series = %id, dependents = dependents.len(), "series removed");
        Ok(())
    }

    pub fn series(&self, id: SeriesId) -> AxisResult<&Series> {
        self.series.get(&id).ok_or(AxisError::UnknownSeries(id))
    }

    pub fn series_ids(&self) -> impl Iterator<Item = SeriesId> + '_ {
        self.series.keys().copied()
    }

    pub fn set_series_data(&mut self, id: SeriesId, items: Vec<DataItem>) -> AxisResult<()> {
        self.series_mut(id)?.set_data(items);
        self.dirty_series.insert(id);
        Ok(())
    }

    pub fn push_data_item(&mut self, id: SeriesId, item: DataItem) -> AxisResult<()> {
        self.series_mut(id)?.push(item);
        self.dirty_series.insert(id);
        Ok(())
    }

    /// Shows or hides a series, animating its working values when
    /// `duration_ms > 0`.
    pub fn set_series_visible(
        &mut self,
        id: SeriesId,
        visible: bool,
        duration_ms: f64,
    ) -> AxisResult<Option<AnimationId>> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(AxisError::InvalidData(
                "visibility duration must be finite and >= 0".to_owned(),
            ));
        }
        let now = self.clock_ms;
        let animation_id = self.ids.allocate();
        let started = self
            .series
            .get_mut(&id)
            .ok_or(AxisError::UnknownSeries(id))?
            .set_visible(visible, duration_ms, now, animation_id);
        self.dirty_series.insert(id);
        if started.is_none() {
            self.pending_events.push(EngineEvent::SeriesVisibilityChanged {
                series: id,
                visible,
            });
        }
        Ok(started)
    }

    /// Post-stacking extents computed by the last frame.
    #[must_use]
    pub fn series_extent(&self, id: SeriesId) -> Option<SeriesExtent> {
        self.extents.get(&id).copied()
    }

    /// Series the item at `index` of `id` is stacked onto.
    pub fn stack_target(&self, id: SeriesId, index: usize) -> AxisResult<Option<SeriesId>> {
        if !self.series.contains_key(&id) {
            return Err(AxisError::UnknownSeries(id));
        }
        Ok(self.stacks.target(id, index))
    }

    fn series_mut(&mut self, id: SeriesId) -> AxisResult<&mut Series> {
        self.series.get_mut(&id).ok_or(AxisError::UnknownSeries(id))
    }
}
