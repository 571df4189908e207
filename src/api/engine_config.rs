use serde::{Deserialize, Serialize};

use crate::core::PlotSize;
use crate::error::{AxisError, AxisResult};
use crate::interaction::GestureConfig;

/// Public engine bootstrap configuration.
///
/// Serializable so host applications can persist chart setup as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub plot: PlotSize,
    #[serde(default)]
    pub gestures: GestureConfig,
    /// Duration of zooms issued by value-axis auto-zoom.
    #[serde(default)]
    pub auto_zoom_duration_ms: f64,
}

impl EngineConfig {
    #[must_use]
    pub fn new(plot: PlotSize) -> Self {
        Self {
            plot,
            gestures: GestureConfig::default(),
            auto_zoom_duration_ms: 0.0,
        }
    }

    #[must_use]
    pub fn with_gestures(mut self, gestures: GestureConfig) -> Self {
        self.gestures = gestures;
        self
    }

    #[must_use]
    pub fn with_auto_zoom_duration_ms(mut self, duration_ms: f64) -> Self {
        self.auto_zoom_duration_ms = duration_ms;
        self
    }

    pub fn validate(self) -> AxisResult<Self> {
        if !self.plot.is_valid() {
            return Err(AxisError::InvalidPlotSize {
                width: self.plot.width,
                height: self.plot.height,
            });
        }
        if !self.auto_zoom_duration_ms.is_finite() || self.auto_zoom_duration_ms < 0.0 {
            return Err(AxisError::InvalidConfig(
                "auto zoom duration must be finite and >= 0".to_owned(),
            ));
        }
        self.gestures.validate()?;
        Ok(self)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> AxisResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| AxisError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> AxisResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| AxisError::InvalidData(format!("failed to parse config: {e}")))
    }
}
