pub mod animation;
pub mod axis_scale;
pub mod primitives;
pub mod ranges;
pub mod rounding;
pub mod scale;
pub mod series;
pub mod stacking;
pub mod sync;
pub mod types;
pub mod viewport;

pub use animation::{Animation, AnimationId, AnimationIds, AnimationStatus, Easing};
pub use axis_scale::{
    AxisConfig, AxisKind, AxisScale, Change, Extremes, ExtremesChange, ExtremesInput, Selection,
    SelectionChange,
};
pub use ranges::{AxisRange, ListChange, RangeList};
pub use rounding::{NiceRange, adjust, adjust_with_precision, settle};
pub use scale::{DomainScale, ScaleMode};
pub use series::{
    BaseSide, DataItem, ItemWindow, Series, SeriesConfig, SeriesExtent, SeriesKind, SeriesMap,
    ValueField,
};
pub use stacking::StackGraph;
pub use sync::{SyncOutcome, sync_to};
pub use types::{AxisDirection, AxisId, PlotSize, Point, SeriesId};
pub use viewport::{
    Viewport, ViewportConfig, ViewportState, ViewportTick, ZoomHandle, ZoomLimits, ZoomOutcome,
    ZoomPriority, deviation_for, shift_within_deviation,
};
