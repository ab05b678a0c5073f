//! Climb detection: find sustained ascents in an activity.
//!
//! A single forward pass over consecutive sample pairs computes the
//! gradient of each step. A step at or above `min_gradient_percent` opens
//! (or extends) a climb candidate. Once a candidate is open, the bar drops
//! to `dip_tolerance_percent`, so short flat or slightly descending
//! stretches inside a real climb (or elevation noise) do not split it.
//! The first step below that bar closes the candidate.
//!
//! A closed candidate becomes a [`ClimbSummary`] only if it is at least
//! `min_length_m` long and its average gradient (positive gain over
//! length) still reaches `min_gradient_percent`.
//!
//! Steps whose distance does not increase are ignored entirely: they
//! neither extend nor close the open candidate.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, time_weighted_average_power};
use crate::types::{ActivityStreams, ClimbSummary, EngineError};

/// Thresholds controlling climb detection.
///
/// The defaults are hand-tuned for road cycling and running activities;
/// they are not derived from any external standard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbParams {
    /// Gradient (percent) needed to open a climb, and the minimum average
    /// gradient of an accepted climb.
    pub min_gradient_percent: f64,

    /// Minimum horizontal length of an accepted climb, in meters.
    pub min_length_m: f64,

    /// Gradient (percent, usually negative) a step must stay at or above
    /// to keep an open climb going.
    pub dip_tolerance_percent: f64,
}

impl ClimbParams {
    pub const DEFAULT_MIN_GRADIENT_PERCENT: f64 = 4.0;
    pub const DEFAULT_MIN_LENGTH_M: f64 = 500.0;
    pub const DEFAULT_DIP_TOLERANCE_PERCENT: f64 = -3.5;

    /// Check the thresholds before a scan.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if a threshold is not finite,
    /// the minimum gradient or length is negative, or the dip tolerance is
    /// stricter than the minimum gradient.
    pub fn validate(&self) -> Result<(), EngineError> {
        let Self {
            min_gradient_percent,
            min_length_m,
            dip_tolerance_percent,
        } = *self;

        if !(min_gradient_percent.is_finite()
            && min_length_m.is_finite()
            && dip_tolerance_percent.is_finite())
        {
            return Err(EngineError::InvalidConfig(format!(
                "climb thresholds must be finite, got {self:?}"
            )));
        }
        if min_gradient_percent < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "minimum gradient must not be negative, got {min_gradient_percent}%"
            )));
        }
        if min_length_m < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "minimum climb length must not be negative, got {min_length_m} m"
            )));
        }
        if dip_tolerance_percent > min_gradient_percent {
            return Err(EngineError::InvalidConfig(format!(
                "dip tolerance {dip_tolerance_percent}% exceeds minimum gradient {min_gradient_percent}%"
            )));
        }
        Ok(())
    }
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            min_gradient_percent: Self::DEFAULT_MIN_GRADIENT_PERCENT,
            min_length_m: Self::DEFAULT_MIN_LENGTH_M,
            dip_tolerance_percent: Self::DEFAULT_DIP_TOLERANCE_PERCENT,
        }
    }
}

/// An open climb candidate being accumulated during the scan.
#[derive(Debug)]
struct ClimbSegment {
    start_index: usize,
    end_index: usize,
    length: f64,
    elevation_gain: f64,
}

impl ClimbSegment {
    const fn open(start_index: usize) -> Self {
        Self {
            start_index,
            end_index: start_index,
            length: 0.0,
            elevation_gain: 0.0,
        }
    }

    fn extend(&mut self, index: usize, distance: f64, height: f64) {
        self.end_index = index;
        self.length += distance;
        if height > 0.0 {
            self.elevation_gain += height;
        }
    }

    fn average_gradient_percent(&self) -> f64 {
        if self.length > 0.0 {
            self.elevation_gain / self.length * 100.0
        } else {
            0.0
        }
    }
}

/// Detect climbs in an activity.
///
/// Returns accepted climbs ordered by start index. The result depends
/// only on `streams` and `params`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `params` fails
/// [`ClimbParams::validate`]. Nothing is scanned in that case.
///
/// # Examples
///
/// ```
/// use climbprint_core::{ActivityStreams, ClimbParams};
/// use climbprint_core::climbs::detect;
///
/// // 1 km at a steady 5%.
/// let distance: Vec<f64> = (0..=10).map(|i| f64::from(i) * 100.0).collect();
/// let elevation: Vec<f64> = (0..=10).map(|i| f64::from(i) * 5.0).collect();
/// let streams = ActivityStreams::new(vec![], distance, elevation, vec![]).unwrap();
///
/// let climbs = detect(&streams, &ClimbParams::default()).unwrap();
/// assert_eq!(climbs.len(), 1);
/// assert!((climbs[0].average_gradient_percent - 5.0).abs() < 1e-9);
/// ```
pub fn detect(
    streams: &ActivityStreams,
    params: &ClimbParams,
) -> Result<Vec<ClimbSummary>, EngineError> {
    params.validate()?;

    let distance = streams.distance();
    let elevation = streams.elevation();
    let mut climbs = Vec::new();
    let mut open: Option<ClimbSegment> = None;

    for i in 1..distance.len() {
        let d = distance[i] - distance[i - 1];
        if d <= 0.0 {
            continue;
        }

        let h = elevation[i] - elevation[i - 1];
        let gradient = h / d * 100.0;
        let uphill = gradient >= params.min_gradient_percent
            || (open.is_some() && gradient >= params.dip_tolerance_percent);

        if uphill {
            open.get_or_insert_with(|| {
                tracing::trace!(start = i - 1, gradient, "climb candidate opened");
                ClimbSegment::open(i - 1)
            })
            .extend(i, d, h);
        } else if let Some(segment) = open.take() {
            climbs.extend(finalize(&segment, streams, params));
        }
    }

    if let Some(segment) = open.take() {
        climbs.extend(finalize(&segment, streams, params));
    }

    tracing::debug!(
        samples = distance.len(),
        climbs = climbs.len(),
        "climb detection finished"
    );
    Ok(climbs)
}

/// Apply the acceptance filters to a closed candidate and summarize it.
fn finalize(
    segment: &ClimbSegment,
    streams: &ActivityStreams,
    params: &ClimbParams,
) -> Option<ClimbSummary> {
    let average_gradient_percent = segment.average_gradient_percent();
    if segment.length < params.min_length_m
        || average_gradient_percent < params.min_gradient_percent
    {
        tracing::debug!(
            start = segment.start_index,
            end = segment.end_index,
            length_m = segment.length,
            average_gradient_percent,
            "climb candidate rejected"
        );
        return None;
    }

    let average_power_watts = if streams.has_power() {
        time_weighted_average_power(
            streams.power(),
            streams.time(),
            segment.start_index,
            segment.end_index,
        )
    } else {
        0.0
    };

    Some(ClimbSummary {
        start_index: segment.start_index,
        end_index: segment.end_index,
        length_m: segment.length,
        elevation_gain_m: segment.elevation_gain,
        average_gradient_percent,
        average_power_watts,
        category: classify(segment.length, segment.elevation_gain),
    })
}
