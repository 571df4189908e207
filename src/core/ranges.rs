use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{AxisError, AxisResult};

/// Annotated value span attached to an axis (guide line, band, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub value: f64,
    #[serde(default)]
    pub end_value: Option<f64>,
    /// Whether the range widens the axis extremes.
    #[serde(default)]
    pub affects_min_max: bool,
}

impl AxisRange {
    #[must_use]
    pub fn at(value: f64) -> Self {
        Self {
            value,
            end_value: None,
            affects_min_max: false,
        }
    }

    #[must_use]
    pub fn spanning(value: f64, end_value: f64) -> Self {
        Self {
            value,
            end_value: Some(end_value),
            affects_min_max: false,
        }
    }

    #[must_use]
    pub fn affecting_min_max(mut self) -> Self {
        self.affects_min_max = true;
        self
    }

    /// Finite `(low, high)` covered by the range, if any.
    #[must_use]
    pub fn bounds(self) -> Option<(f64, f64)> {
        let end = self.end_value.unwrap_or(self.value);
        match (self.value.is_finite(), end.is_finite()) {
            (true, true) => Some((self.value.min(end), self.value.max(end))),
            (true, false) => Some((self.value, self.value)),
            (false, true) => Some((end, end)),
            (false, false) => None,
        }
    }
}

/// Mutation applied to an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListChange<T> {
    Clear,
    Push(T),
    InsertIndex { index: usize, value: T },
    SetIndex { index: usize, value: T },
    RemoveIndex { index: usize },
    MoveIndex { from: usize, to: usize },
}

/// Ordered axis ranges with change tracking for extremes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeList {
    items: Vec<AxisRange>,
}

impl RangeList {
    #[must_use]
    pub fn as_slice(&self) -> &[AxisRange] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applies `change` and reports whether axis extremes must be recomputed.
    pub fn apply(&mut self, change: ListChange<AxisRange>) -> AxisResult<bool> {
        let len = self.items.len();
        let affects = match change {
            ListChange::Clear => {
                let affects = self.items.iter().any(|range| range.affects_min_max);
                self.items.clear();
                affects
            }
            ListChange::Push(value) => {
                self.items.push(value);
                value.affects_min_max
            }
            ListChange::InsertIndex { index, value } => {
                if index > len {
                    return Err(AxisError::RangeIndexOutOfBounds { index, len });
                }
                self.items.insert(index, value);
                value.affects_min_max
            }
            ListChange::SetIndex { index, value } => {
                let slot = self
                    .items
                    .get_mut(index)
                    .ok_or(AxisError::RangeIndexOutOfBounds { index, len })?;
                let previous = std::mem::replace(slot, value);
                previous.affects_min_max || value.affects_min_max
            }
            ListChange::RemoveIndex { index } => {
                if index >= len {
                    return Err(AxisError::RangeIndexOutOfBounds { index, len });
                }
                self.items.remove(index).affects_min_max
            }
            ListChange::MoveIndex { from, to } => {
                if from >= len {
                    return Err(AxisError::RangeIndexOutOfBounds { index: from, len });
                }
                if to >= len {
                    return Err(AxisError::RangeIndexOutOfBounds { index: to, len });
                }
                let moved = self.items.remove(from);
                self.items.insert(to, moved);
                false
            }
        };
        trace!(len = self.items.len(), affects, "axis ranges changed");
        Ok(affects)
    }

    /// Union of the bounds of every range flagged `affects_min_max`.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.items
            .iter()
            .filter(|range| range.affects_min_max)
            .filter_map(|range| range.bounds())
            .fold(None, |acc, (low, high)| match acc {
                None => Some((low, high)),
                Some((min, max)) => Some((min.min(low), max.max(high))),
            })
    }
}
