use thiserror::Error;

use crate::core::{AxisId, SeriesId};

pub type AxisResult<T> = Result<T, AxisError>;

/// Errors reported for API misuse.
///
/// Numeric degeneracy in data (non-finite values, zero-width ranges) is never
/// reported here; it resolves to fallback bounds instead.
#[derive(Debug, Error, PartialEq)]
pub enum AxisError {
    #[error("invalid plot size: width={width}, height={height}")]
    InvalidPlotSize { width: f64, height: f64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown axis: {0}")]
    UnknownAxis(AxisId),

    #[error("unknown series: {0}")]
    UnknownSeries(SeriesId),

    #[error("range list index {index} out of bounds (len {len})")]
    RangeIndexOutOfBounds { index: usize, len: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
