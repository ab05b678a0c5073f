//! Shared types for the climbprint activity engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::polyline::PolylineFault;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both components are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A 2D point in rendering-layer coordinates.
///
/// Origin is the top-left corner and `y` grows downward, so larger
/// elevations and more northern latitudes map to *smaller* `y` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Horizontal position from the left edge.
    pub x: f64,
    /// Vertical position from the top edge.
    pub y: f64,
}

impl ChartPoint {
    /// Create a new chart point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An inclusive range of sample indices into an activity stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpan {
    /// First sample index.
    pub start: usize,
    /// Last sample index (inclusive).
    pub end: usize,
}

impl IndexSpan {
    /// Create a new span covering `start..=end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of sample-to-sample steps covered by the span.
    ///
    /// Zero for single-sample spans and for inverted spans.
    #[must_use]
    pub const fn width(self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Identifies one of the recorded activity streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Time,
    Distance,
    Elevation,
    Power,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Time => "time",
            Self::Distance => "distance",
            Self::Elevation => "elevation",
            Self::Power => "power",
        };
        f.write_str(name)
    }
}

/// Recorded activity samples, index-aligned across streams.
///
/// Index `i` refers to the same instant in every non-empty stream.
/// `distance` and `elevation` are always present and equally long;
/// `time` and `power` are either empty (not recorded) or the same length.
/// The invariants are checked once on construction, after which the
/// streams are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActivityStreams")]
pub struct ActivityStreams {
    time: Vec<f64>,
    distance: Vec<f64>,
    elevation: Vec<f64>,
    power: Vec<f64>,
}

/// Unvalidated deserialization target for [`ActivityStreams`].
#[derive(Deserialize)]
struct RawActivityStreams {
    #[serde(default)]
    time: Vec<f64>,
    distance: Vec<f64>,
    elevation: Vec<f64>,
    #[serde(default)]
    power: Vec<f64>,
}

impl TryFrom<RawActivityStreams> for ActivityStreams {
    type Error = EngineError;

    fn try_from(raw: RawActivityStreams) -> Result<Self, Self::Error> {
        Self::new(raw.time, raw.distance, raw.elevation, raw.power)
    }
}

impl ActivityStreams {
    /// Build a validated set of activity streams.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StreamLengthMismatch`] if `elevation` is not
    /// as long as `distance`, or if a non-empty `time`/`power` stream has a
    /// different length. Returns [`EngineError::PowerWithoutTime`] if power
    /// was recorded without timestamps.
    pub fn new(
        time: Vec<f64>,
        distance: Vec<f64>,
        elevation: Vec<f64>,
        power: Vec<f64>,
    ) -> Result<Self, EngineError> {
        let expected = distance.len();
        let check = |stream: StreamKind, samples: &[f64], optional: bool| {
            if samples.len() == expected || (optional && samples.is_empty()) {
                Ok(())
            } else {
                Err(EngineError::StreamLengthMismatch {
                    stream,
                    expected,
                    actual: samples.len(),
                })
            }
        };
        check(StreamKind::Elevation, &elevation, false)?;
        check(StreamKind::Time, &time, true)?;
        check(StreamKind::Power, &power, true)?;
        if !power.is_empty() && time.is_empty() {
            return Err(EngineError::PowerWithoutTime);
        }

        Ok(Self {
            time,
            distance,
            elevation,
            power,
        })
    }

    /// Timestamps in seconds (empty when not recorded).
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Cumulative distance in meters.
    #[must_use]
    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    /// Elevation in meters.
    #[must_use]
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Power in watts (empty when not recorded).
    #[must_use]
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Returns `true` if a power stream was recorded.
    #[must_use]
    pub fn has_power(&self) -> bool {
        !self.power.is_empty()
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    /// Returns `true` if the activity has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }
}

/// Climb difficulty category, from hardest (`Hc`) to uncategorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimbCategory {
    #[serde(rename = "HC")]
    Hc,
    #[serde(rename = "1")]
    Cat1,
    #[serde(rename = "2")]
    Cat2,
    #[serde(rename = "3")]
    Cat3,
    #[serde(rename = "4")]
    Cat4,
    #[serde(rename = "-")]
    Uncategorized,
}

impl ClimbCategory {
    /// Short label used on posters (`"HC"`, `"1"` .. `"4"`, `"-"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hc => "HC",
            Self::Cat1 => "1",
            Self::Cat2 => "2",
            Self::Cat3 => "3",
            Self::Cat4 => "4",
            Self::Uncategorized => "-",
        }
    }
}

impl fmt::Display for ClimbCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A detected climb, summarized for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbSummary {
    /// Sample index where the climb starts.
    pub start_index: usize,
    /// Sample index where the climb ends (inclusive).
    pub end_index: usize,
    /// Horizontal length in meters.
    pub length_m: f64,
    /// Sum of positive elevation deltas in meters.
    pub elevation_gain_m: f64,
    /// `elevation_gain_m / length_m * 100`.
    pub average_gradient_percent: f64,
    /// Time-weighted average power, 0 when power was not recorded.
    pub average_power_watts: f64,
    pub category: ClimbCategory,
}

impl ClimbSummary {
    /// The sample range covered by this climb.
    #[must_use]
    pub const fn span(&self) -> IndexSpan {
        IndexSpan::new(self.start_index, self.end_index)
    }
}

/// Errors reported by the engine.
///
/// Degenerate numeric input (flat elevation, zero-size bounds, zero
/// duration) is never an error; those cases have documented fallbacks.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum EngineError {
    /// The encoded polyline could not be decoded.
    #[error("malformed encoded polyline at byte {offset}: {reason}")]
    MalformedPolyline { offset: usize, reason: PolylineFault },

    /// A stream does not have the same number of samples as `distance`.
    #[error("{stream} stream has {actual} samples, expected {expected}")]
    StreamLengthMismatch {
        stream: StreamKind,
        expected: usize,
        actual: usize,
    },

    /// Power samples cannot be weighted without timestamps.
    #[error("power stream recorded without a time stream")]
    PowerWithoutTime,

    /// A geographic point has a NaN or infinite component.
    #[error("non-finite coordinate at index {index}")]
    NonFiniteCoordinate { index: usize },

    /// A parameter is out of range.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
