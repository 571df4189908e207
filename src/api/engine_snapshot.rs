use serde::{Deserialize, Serialize};

use crate::core::{
    AxisId, Extremes, PlotSize, Selection, SeriesExtent, SeriesId, ViewportState,
};
use crate::error::{AxisError, AxisResult};
use crate::interaction::GestureMode;

use super::AxisEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub id: AxisId,
    pub extremes: Option<Extremes>,
    pub displayed_finals: Option<(f64, f64)>,
    pub selection: Option<Selection>,
    pub start: f64,
    pub end: f64,
    pub state: ViewportState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub id: SeriesId,
    pub extent: Option<SeriesExtent>,
    pub hidden: bool,
    pub weight: f64,
    pub stack_targets: Vec<Option<SeriesId>>,
}

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub clock_ms: f64,
    pub plot: PlotSize,
    pub gesture_mode: GestureMode,
    pub axes: Vec<AxisSnapshot>,
    pub series: Vec<SeriesSnapshot>,
}

impl AxisEngine {
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            clock_ms: self.clock_ms,
            plot: self.config.plot,
            gesture_mode: self.gestures.mode(),
            axes: self
                .axes
                .iter()
                .map(|(id, node)| AxisSnapshot {
                    id: *id,
                    extremes: node.scale.extremes(),
                    displayed_finals: node.scale.displayed_finals(),
                    selection: node.scale.selection(),
                    start: node.viewport.start(),
                    end: node.viewport.end(),
                    state: node.viewport.state(),
                })
                .collect(),
            series: self
                .series
                .iter()
                .map(|(id, series)| SeriesSnapshot {
                    id: *id,
                    extent: self.extents.get(id).copied(),
                    hidden: series.is_hidden(),
                    weight: series.weight(),
                    stack_targets: self.stacks.targets(*id).to_vec(),
                })
                .collect(),
        }
    }

    /// Serializes snapshot as pretty JSON for fixture-based regression checks.
    pub fn snapshot_json_pretty(&self) -> AxisResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| AxisError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
