use serde::{Deserialize, Serialize};

use crate::error::{AxisError, AxisResult};

/// Value/position mapping mode of a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScaleMode {
    /// Uniform spacing in raw value units.
    #[default]
    Linear,
    /// Uniform spacing in natural-log units (domain must be > 0).
    Logarithmic,
}

/// Bidirectional mapping between domain values and relative positions.
///
/// Position 0 is the domain minimum and 1 the maximum; positions outside
/// `[0, 1]` extrapolate linearly in the transformed space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScale {
    min: f64,
    max: f64,
    mode: ScaleMode,
    zero_floor: f64,
}

impl DomainScale {
    pub fn linear(min: f64, max: f64) -> AxisResult<Self> {
        validate_domain(min, max)?;
        Ok(Self {
            min,
            max,
            mode: ScaleMode::Linear,
            zero_floor: min,
        })
    }

    /// Log domain; `zero_floor` replaces non-positive values during mapping.
    pub fn logarithmic(min: f64, max: f64, zero_floor: f64) -> AxisResult<Self> {
        validate_domain(min, max)?;
        if min <= 0.0 {
            return Err(AxisError::InvalidData(
                "logarithmic domain must be > 0".to_owned(),
            ));
        }
        let zero_floor = if zero_floor.is_finite() && zero_floor > 0.0 {
            zero_floor
        } else {
            min
        };
        Ok(Self {
            min,
            max,
            mode: ScaleMode::Logarithmic,
            zero_floor,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn mode(self) -> ScaleMode {
        self.mode
    }

    #[must_use]
    pub fn value_to_position(self, value: f64) -> f64 {
        match self.mode {
            ScaleMode::Linear => (value - self.min) / (self.max - self.min),
            ScaleMode::Logarithmic => {
                let value = if value > 0.0 { value } else { self.zero_floor };
                let low = self.min.ln();
                (value.ln() - low) / (self.max.ln() - low)
            }
        }
    }

    #[must_use]
    pub fn position_to_value(self, position: f64) -> f64 {
        match self.mode {
            ScaleMode::Linear => self.min + position * (self.max - self.min),
            ScaleMode::Logarithmic => {
                let low = self.min.ln();
                (low + position * (self.max.ln() - low)).exp()
            }
        }
    }

    /// Pixel offset of `position` along an axis of `length` pixels.
    #[must_use]
    pub fn position_to_coordinate(position: f64, length: f64) -> f64 {
        position * length
    }
}

fn validate_domain(min: f64, max: f64) -> AxisResult<()> {
    if !min.is_finite() || !max.is_finite() || min == max {
        return Err(AxisError::InvalidData(
            "scale domain must be finite and non-zero".to_owned(),
        ));
    }
    Ok(())
}
