mod axis_controller;
mod engine_config;
mod engine_snapshot;
mod extremes_coordinator;
mod frame_controller;
mod gesture_controller;
mod series_controller;

use indexmap::{IndexMap, IndexSet};

use crate::core::{
    AnimationIds, AxisId, AxisScale, RangeList, SeriesExtent, SeriesId, SeriesMap, StackGraph,
    Viewport,
};
use crate::error::AxisResult;
use crate::interaction::GestureMapper;

pub use engine_config::EngineConfig;
pub use engine_snapshot::{AxisSnapshot, EngineSnapshot, SeriesSnapshot};
pub use frame_controller::{EngineEvent, FrameReport};

/// Per-axis state owned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct AxisNode {
    pub(super) scale: AxisScale,
    pub(super) viewport: Viewport,
    pub(super) ranges: RangeList,
}

/// Frame-driven facade tying axes, series, stacks and gestures together.
///
/// All mutation happens through `&mut self`; `tick` applies pending work
/// in a fixed order so reads after a tick observe a consistent frame.
#[derive(Debug, Clone)]
pub struct AxisEngine {
    pub(super) config: EngineConfig,
    pub(super) axes: IndexMap<AxisId, AxisNode>,
    pub(super) series: SeriesMap,
    pub(super) stacks: StackGraph,
    pub(super) extents: IndexMap<SeriesId, SeriesExtent>,
    pub(super) gestures: GestureMapper,
    pub(super) ids: AnimationIds,
    pub(super) clock_ms: f64,
    pub(super) next_axis: u32,
    pub(super) next_series: u32,
    pub(super) dirty_series: IndexSet<SeriesId>,
    pub(super) dirty_axes: IndexSet<AxisId>,
    pub(super) pending_events: Vec<EngineEvent>,
}

impl AxisEngine {
    pub fn new(config: EngineConfig) -> AxisResult<Self> {
        let config = config.validate()?;
        let gestures = GestureMapper::new(config.gestures, config.plot)?;
        Ok(Self {
            config,
            axes: IndexMap::new(),
            series: SeriesMap::new(),
            stacks: StackGraph::default(),
            extents: IndexMap::new(),
            gestures,
            ids: AnimationIds::default(),
            clock_ms: 0.0,
            next_axis: 0,
            next_series: 0,
            dirty_series: IndexSet::new(),
            dirty_axes: IndexSet::new(),
            pending_events: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clock of the last frame.
    #[must_use]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }
}
