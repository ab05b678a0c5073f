//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::climbs::ClimbParams;
use crate::projection::GeoProjection;
use crate::types::EngineError;

/// Size and sampling of the elevation profile chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart width in output units.
    pub width: f64,

    /// Chart height in output units. The lowest elevation is drawn at
    /// this `y`.
    pub height: f64,

    /// Keep every `stride`-th sample. Activity streams are typically
    /// recorded at 1 Hz, far denser than a chart needs.
    pub stride: usize,
}

impl ChartConfig {
    pub const DEFAULT_WIDTH: f64 = 1000.0;
    pub const DEFAULT_HEIGHT: f64 = 250.0;
    pub const DEFAULT_STRIDE: usize = 25;

    /// Check that the chart has a usable size and stride.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `stride` is 0 or either
    /// dimension is negative or non-finite.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.stride == 0 {
            return Err(EngineError::InvalidConfig(
                "chart stride must be at least 1".to_string(),
            ));
        }
        if !(self.width.is_finite() && self.width >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "chart width must be finite and non-negative, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "chart height must be finite and non-negative, got {}",
                self.height
            )));
        }
        Ok(())
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            stride: Self::DEFAULT_STRIDE,
        }
    }
}

/// Everything [`analyze`](crate::analyze) needs besides the activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Climb detection thresholds.
    pub climbs: ClimbParams,

    /// Elevation profile chart.
    pub chart: ChartConfig,

    /// How a route polyline is fitted into its drawing area.
    pub route: GeoProjection,
}

impl EngineConfig {
    pub const DEFAULT_ROUTE_SIZE: f64 = 1000.0;
    pub const DEFAULT_ROUTE_PADDING: f64 = 20.0;

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError::InvalidConfig`] found.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.climbs.validate()?;
        self.chart.validate()?;
        self.route.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            climbs: ClimbParams::default(),
            chart: ChartConfig::default(),
            route: GeoProjection::AutoSize {
                max_dimension: Self::DEFAULT_ROUTE_SIZE,
                padding: Self::DEFAULT_ROUTE_PADDING,
            },
        }
    }
}
