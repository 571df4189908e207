use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel-extremes")]
use rayon::prelude::*;

use crate::core::animation::{Animation, AnimationId, AnimationStatus};
use crate::core::primitives::decimal_to_f64;
use crate::core::stacking::StackGraph;
use crate::core::types::{AxisId, SeriesId};
use crate::error::{AxisError, AxisResult};

/// Series registry in registration (and therefore stacking) order.
pub type SeriesMap = IndexMap<SeriesId, Series>;

/// Series type; only series of the same kind stack onto each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SeriesKind {
    #[default]
    Line,
    Column,
    Area,
    Candlestick,
}

/// Which of the two attached axes indexes the data items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BaseSide {
    #[default]
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueField {
    Value,
    Open,
    Low,
    High,
}

impl ValueField {
    pub const ALL: [Self; 4] = [Self::Value, Self::Open, Self::Low, Self::High];
}

/// One data point. `value` doubles as the close of OHLC items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DataItem {
    /// Coordinate on a numeric base axis; category base axes use the index.
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

impl DataItem {
    #[must_use]
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(base: f64, value: f64) -> Self {
        Self {
            base: Some(base),
            value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ohlc(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            base: None,
            value: Some(close),
            open: Some(open),
            low: Some(low),
            high: Some(high),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = Some(base);
        self
    }

    pub fn from_decimal(base: Option<Decimal>, value: Decimal) -> AxisResult<Self> {
        Ok(Self {
            base: base.map(|base| decimal_to_f64(base, "base")).transpose()?,
            value: Some(decimal_to_f64(value, "value")?),
            ..Self::default()
        })
    }

    /// Finite value of `field`, if present.
    #[must_use]
    pub fn field(self, field: ValueField) -> Option<f64> {
        let raw = match field {
            ValueField::Value => self.value,
            ValueField::Open => self.open,
            ValueField::Low => self.low,
            ValueField::High => self.high,
        };
        raw.filter(|value| value.is_finite())
    }

    #[must_use]
    pub fn base_coordinate(self) -> Option<f64> {
        self.base.filter(|base| base.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub kind: SeriesKind,
    pub x_axis: AxisId,
    pub y_axis: AxisId,
    #[serde(default)]
    pub base_side: BaseSide,
    #[serde(default)]
    pub stacked: bool,
    #[serde(default = "default_stack_to_negative")]
    pub stack_to_negative: bool,
    #[serde(default)]
    pub ignore_min_max: bool,
}

fn default_stack_to_negative() -> bool {
    true
}

impl SeriesConfig {
    #[must_use]
    pub fn new(kind: SeriesKind, x_axis: AxisId, y_axis: AxisId) -> Self {
        Self {
            kind,
            x_axis,
            y_axis,
            base_side: BaseSide::X,
            stacked: false,
            stack_to_negative: default_stack_to_negative(),
            ignore_min_max: false,
        }
    }

    #[must_use]
    pub fn with_base_side(mut self, base_side: BaseSide) -> Self {
        self.base_side = base_side;
        self
    }

    #[must_use]
    pub fn with_stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    #[must_use]
    pub fn with_stack_to_negative(mut self, stack_to_negative: bool) -> Self {
        self.stack_to_negative = stack_to_negative;
        self
    }

    #[must_use]
    pub fn with_ignore_min_max(mut self, ignore_min_max: bool) -> Self {
        self.ignore_min_max = ignore_min_max;
        self
    }

    #[must_use]
    pub fn base_axis(self) -> AxisId {
        match self.base_side {
            BaseSide::X => self.x_axis,
            BaseSide::Y => self.y_axis,
        }
    }

    #[must_use]
    pub fn value_axis(self) -> AxisId {
        match self.base_side {
            BaseSide::X => self.y_axis,
            BaseSide::Y => self.x_axis,
        }
    }

    #[must_use]
    pub fn shares_axes_with(self, other: Self) -> bool {
        self.x_axis == other.x_axis && self.y_axis == other.y_axis && self.kind == other.kind
    }

    pub fn validate(self) -> AxisResult<Self> {
        if self.x_axis == self.y_axis {
            return Err(AxisError::InvalidConfig(
                "series x and y axes must differ".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Show/hide state. `weight` scales working values towards the base value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    hidden: bool,
    weight: f64,
    animation: Option<Animation>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            hidden: false,
            weight: 1.0,
            animation: None,
        }
    }
}

/// Outcome of advancing a visibility animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityTick {
    pub weight_changed: bool,
    pub finished: bool,
}

/// Items considered when folding extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemWindow {
    All,
    /// Half-open index range.
    Indices { start: usize, end: usize },
    /// Items whose base coordinate lies in `[min, max]`.
    Base { min: f64, max: f64 },
}

/// Post-stacking extremes of one series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesExtent {
    pub value: Option<(f64, f64)>,
    pub base: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    id: SeriesId,
    config: SeriesConfig,
    items: Vec<DataItem>,
    visibility: Visibility,
}

impl Series {
    pub fn new(id: SeriesId, config: SeriesConfig) -> AxisResult<Self> {
        Ok(Self {
            id,
            config: config.validate()?,
            items: Vec::new(),
            visibility: Visibility::default(),
        })
    }

    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> SeriesConfig {
        self.config
    }

    #[must_use]
    pub fn items(&self) -> &[DataItem] {
        &self.items
    }

    pub fn set_data(&mut self, items: Vec<DataItem>) {
        self.items = items;
    }

    pub fn push(&mut self, item: DataItem) {
        self.items.push(item);
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<DataItem> {
        self.items.get(index).copied()
    }

    #[must_use]
    pub fn real_value(&self, index: usize, field: ValueField) -> Option<f64> {
        self.item(index).and_then(|item| item.field(field))
    }

    /// `base + (real - base) * weight` for `field` at `index`.
    #[must_use]
    pub fn working_value(&self, index: usize, field: ValueField, base: f64) -> Option<f64> {
        let real = self.real_value(index, field)?;
        Some(base + (real - base) * self.visibility.weight)
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.visibility.hidden
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.visibility.weight
    }

    /// Hidden with the hide transition complete.
    #[must_use]
    pub fn is_fully_hidden(&self) -> bool {
        self.visibility.hidden && self.visibility.animation.is_none() && self.visibility.weight == 0.0
    }

    #[must_use]
    pub fn visibility_animation(&self) -> Option<Animation> {
        self.visibility.animation
    }

    /// Starts a show/hide transition. Returns `None` when applied immediately.
    pub fn set_visible(
        &mut self,
        visible: bool,
        duration_ms: f64,
        now_ms: f64,
        id: AnimationId,
    ) -> Option<AnimationId> {
        self.visibility.hidden = !visible;
        let target = if visible { 1.0 } else { 0.0 };
        if duration_ms > 0.0 && self.visibility.weight != target {
            self.visibility.animation = Some(Animation::new(
                id,
                self.visibility.weight,
                target,
                now_ms,
                duration_ms,
            ));
            debug!(series = %self.id, visible, duration_ms, "series visibility animating");
            Some(id)
        } else {
            self.visibility.animation = None;
            self.visibility.weight = target;
            debug!(series = %self.id, visible, "series visibility applied");
            None
        }
    }

    pub fn tick_visibility(&mut self, now_ms: f64) -> VisibilityTick {
        let Some(animation) = self.visibility.animation else {
            return VisibilityTick::default();
        };
        let (weight, status) = animation.sample(now_ms);
        let weight_changed = weight != self.visibility.weight;
        self.visibility.weight = weight;
        let finished = status == AnimationStatus::Finished;
        if finished {
            self.visibility.animation = None;
        }
        VisibilityTick {
            weight_changed,
            finished,
        }
    }

    fn window_indices(&self, window: ItemWindow) -> Vec<usize> {
        match window {
            ItemWindow::All => (0..self.items.len()).collect(),
            ItemWindow::Indices { start, end } => {
                (start.min(self.items.len())..end.min(self.items.len())).collect()
            }
            ItemWindow::Base { min, max } => self
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| {
                    item.base_coordinate()
                        .is_some_and(|base| base >= min && base <= max)
                })
                .map(|(index, _)| index)
                .collect(),
        }
    }
}

/// Folds post-stacking value and base extremes of `id` over `window`.
///
/// Stacked items include the top of the tower they sit on, so a stacked
/// column spans from its stack bottom to its own top.
#[must_use]
pub fn compute_extent(
    series_map: &SeriesMap,
    stacks: &StackGraph,
    id: SeriesId,
    base_value: f64,
    window: ItemWindow,
) -> SeriesExtent {
    let Some(series) = series_map.get(&id) else {
        return SeriesExtent::default();
    };
    if series.is_fully_hidden() {
        return SeriesExtent::default();
    }

    let indices = series.window_indices(window);
    let item_value_bounds = |index: usize| -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        let mut include = |value: f64| {
            bounds = Some(match bounds {
                None => (value, value),
                Some((low, high)) => (low.min(value), high.max(value)),
            });
        };
        for field in ValueField::ALL {
            if let Some(value) = stacks.stacked_value(series_map, id, index, field, base_value) {
                include(value);
            }
        }
        if let Some(target) = stacks.target(id, index) {
            if let Some(bottom) =
                stacks.stacked_value(series_map, target, index, ValueField::Value, base_value)
            {
                include(bottom);
            }
        }
        bounds
    };
    let item_base = |index: usize| -> Option<f64> {
        let item = series.item(index)?;
        item.base_coordinate().or(Some(index as f64))
    };

    let value = if series.config.ignore_min_max {
        None
    } else {
        fold_bounds(indices.as_slice(), item_value_bounds)
    };
    let base = fold_bounds(indices.as_slice(), |index| {
        item_base(index).map(|base| (base, base))
    });

    SeriesExtent { value, base }
}

#[cfg(feature = "parallel-extremes")]
fn fold_bounds<F>(indices: &[usize], bounds: F) -> Option<(f64, f64)>
where
    F: Fn(usize) -> Option<(f64, f64)> + Sync,
{
    indices
        .par_iter()
        .filter_map(|index| bounds(*index))
        .map(|(low, high)| (OrderedFloat(low), OrderedFloat(high)))
        .reduce_with(|(low_a, high_a), (low_b, high_b)| (low_a.min(low_b), high_a.max(high_b)))
        .map(|(low, high)| (low.0, high.0))
}

#[cfg(not(feature = "parallel-extremes"))]
fn fold_bounds<F>(indices: &[usize], bounds: F) -> Option<(f64, f64)>
where
    F: Fn(usize) -> Option<(f64, f64)>,
{
    indices
        .iter()
        .filter_map(|index| bounds(*index))
        .map(|(low, high)| (OrderedFloat(low), OrderedFloat(high)))
        .reduce(|(low_a, high_a), (low_b, high_b)| (low_a.min(low_b), high_a.max(high_b)))
        .map(|(low, high)| (low.0, high.0))
}

#[cfg(test)]
mod tests {
    use super::{DataItem, ValueField};
    use rust_decimal::Decimal;

    #[test]
    fn non_finite_fields_read_as_missing() {
        let item = DataItem {
            value: Some(f64::NAN),
            high: Some(4.0),
            ..DataItem::default()
        };
        assert_eq!(item.field(ValueField::Value), None);
        assert_eq!(item.field(ValueField::High), Some(4.0));
    }

    #[test]
    fn decimal_items_convert_exactly() {
        let item = DataItem::from_decimal(Some(Decimal::new(3, 0)), Decimal::new(1225, 2))
            .expect("decimal item");
        assert_eq!(item.base, Some(3.0));
        assert_eq!(item.value, Some(12.25));
    }
}
