//! chart-axis: numeric axis scaling and zoom/pan viewport engine.
//!
//! The crate computes "nice" axis bounds and grid steps, resolves stacked
//! series totals, keeps a constrained zoom/pan viewport per axis and maps
//! wheel, drag and pinch gestures onto it. Rendering is left to the host,
//! which reads position/value conversions from [`AxisEngine`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod telemetry;

pub use api::{AxisEngine, EngineConfig, EngineEvent, EngineSnapshot, FrameReport};
pub use error::{AxisError, AxisResult};
pub use interaction::{GestureConfig, GestureMode, PointerId, WheelBehavior};
