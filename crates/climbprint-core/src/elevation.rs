//! Elevation profile charts.
//!
//! Converts a 1-D elevation series into [`ChartPoint`]s inside a
//! `max_width` x `max_height` box. Elevations are normalized against the
//! series' own minimum and maximum so the lowest sample sits on the bottom
//! edge (`y = max_height`) and the highest on the top edge (`y = 0`).
//! Samples are spread evenly along `x` regardless of the distance between
//! them.
//!
//! A flat series has no vertical range; every point is then placed on the
//! bottom edge instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::types::{ChartPoint, ClimbSummary, EngineError, IndexSpan};

/// A contiguous part of a sliced profile, drawn as one polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRegion {
    /// Sample range covered, in indices of the full elevation series.
    pub span: IndexSpan,
    /// Whether the region belongs to a highlighted range (e.g. a climb).
    pub highlighted: bool,
    /// Projected profile points, first and last sample always included.
    pub points: Vec<ChartPoint>,
}

/// Width and height of a single climb's profile chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartExtent {
    pub width: f64,
    pub height: f64,
}

/// Project an elevation series into chart coordinates.
///
/// Only every `stride`-th sample is kept, starting with the first, so the
/// result has `ceil(n / stride)` points.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if `stride` is 0 or the chart
/// size is negative or non-finite.
///
/// # Examples
///
/// ```
/// use climbprint_core::elevation::project;
///
/// let points = project(&[100.0, 150.0, 200.0], 10.0, 4.0, 1).unwrap();
/// assert_eq!(points.len(), 3);
/// assert!((points[0].y - 4.0).abs() < 1e-12); // lowest sample on the bottom edge
/// assert!((points[2].x - 10.0).abs() < 1e-12);
/// assert!(points[2].y.abs() < 1e-12); // highest sample on the top edge
/// ```
pub fn project(
    elevations: &[f64],
    max_width: f64,
    max_height: f64,
    stride: usize,
) -> Result<Vec<ChartPoint>, EngineError> {
    validate_chart(max_width, max_height, stride)?;
    let Some(scale) = ProfileScale::fit(elevations, max_width, max_height) else {
        return Ok(Vec::new());
    };

    Ok(elevations
        .iter()
        .enumerate()
        .step_by(stride)
        .map(|(i, &e)| scale.point(i, e))
        .collect())
}

/// Project `elevations[span.start..=span.end]` as a sequence of regions,
/// alternating between `highlights` and the gaps around them.
///
/// Highlights are given in indices of the full series. They may arrive in
/// any order, extend past the span (they are clipped), or overlap (later
/// ones are trimmed to start where the previous ended). Gaps before,
/// between and after highlights become non-highlighted filler regions.
/// Neighbouring regions share their boundary sample so the polygons abut,
/// and regions that would cover a single sample are dropped.
///
/// Normalization uses the slice's own min/max, and `x` runs from 0 at
/// `span.start` to `max_width` at `span.end`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if the span is empty, reversed
/// or out of bounds, a highlight is reversed, `stride` is 0, or the chart
/// size is unusable.
pub fn project_slice(
    elevations: &[f64],
    span: IndexSpan,
    highlights: &[IndexSpan],
    max_width: f64,
    max_height: f64,
    stride: usize,
) -> Result<Vec<ChartRegion>, EngineError> {
    validate_chart(max_width, max_height, stride)?;
    if span.start >= span.end || span.end >= elevations.len() {
        return Err(EngineError::InvalidConfig(format!(
            "slice {}..={} is not a non-empty range inside {} samples",
            span.start,
            span.end,
            elevations.len(),
        )));
    }
    if let Some(bad) = highlights.iter().find(|h| h.start > h.end) {
        return Err(EngineError::InvalidConfig(format!(
            "highlight {}..={} is reversed",
            bad.start, bad.end,
        )));
    }

    let slice = &elevations[span.start..=span.end];
    let Some(scale) = ProfileScale::fit(slice, max_width, max_height) else {
        return Ok(Vec::new());
    };

    Ok(partition(span, highlights)
        .into_iter()
        .map(|(region, highlighted)| ChartRegion {
            span: region,
            highlighted,
            points: region_points(slice, span.start, region, &scale, stride),
        })
        .collect())
}

/// Close a profile line into a polygon ring down to `baseline_y`.
///
/// Appends the point below the last sample and the point below the first
/// sample, so the ring can be filled directly.
#[must_use]
pub fn close_to_baseline(points: &[ChartPoint], baseline_y: f64) -> Vec<ChartPoint> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let mut ring = Vec::with_capacity(points.len() + 2);
    ring.extend_from_slice(points);
    ring.push(ChartPoint::new(last.x, baseline_y));
    ring.push(ChartPoint::new(first.x, baseline_y));
    ring
}

/// Size each climb's chart relative to the largest climb.
///
/// The longest climb gets the full `max_width` and the climb with the
/// biggest gain the full `max_height`; others shrink proportionally so
/// profiles drawn side by side share one scale.
#[must_use]
pub fn climb_chart_extents(
    climbs: &[ClimbSummary],
    max_width: f64,
    max_height: f64,
) -> Vec<ChartExtent> {
    let longest = climbs.iter().map(|c| c.length_m).fold(0.0, f64::max);
    let biggest_gain = climbs.iter().map(|c| c.elevation_gain_m).fold(0.0, f64::max);
    let ratio = |value: f64, reference: f64| {
        if reference > 0.0 { value / reference } else { 0.0 }
    };

    climbs
        .iter()
        .map(|c| ChartExtent {
            width: ratio(c.length_m, longest) * max_width,
            height: ratio(c.elevation_gain_m, biggest_gain) * max_height,
        })
        .collect()
}

/// Split `span` into highlighted and filler regions.
fn partition(span: IndexSpan, highlights: &[IndexSpan]) -> Vec<(IndexSpan, bool)> {
    let mut clipped: Vec<IndexSpan> = highlights
        .iter()
        .map(|h| IndexSpan::new(h.start.max(span.start), h.end.min(span.end)))
        .filter(|h| h.end > h.start)
        .collect();
    clipped.sort_by_key(|h| (h.start, h.end));

    let mut regions = Vec::with_capacity(2 * clipped.len() + 1);
    let mut cursor = span.start;
    for h in clipped {
        let start = h.start.max(cursor);
        if h.end <= start {
            continue;
        }
        if start > cursor {
            regions.push((IndexSpan::new(cursor, start), false));
        }
        regions.push((IndexSpan::new(start, h.end), true));
        cursor = h.end;
    }
    if span.end > cursor {
        regions.push((IndexSpan::new(cursor, span.end), false));
    }

    regions
}

fn region_points(
    slice: &[f64],
    origin: usize,
    region: IndexSpan,
    scale: &ProfileScale,
    stride: usize,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = (region.start..=region.end)
        .step_by(stride)
        .map(|i| scale.point(i - origin, slice[i - origin]))
        .collect();
    if region.width() % stride != 0 {
        let last = region.end - origin;
        points.push(scale.point(last, slice[last]));
    }
    points
}

fn validate_chart(max_width: f64, max_height: f64, stride: usize) -> Result<(), EngineError> {
    if stride == 0 {
        return Err(EngineError::InvalidConfig(
            "stride must be at least 1".to_string(),
        ));
    }
    if !(max_width.is_finite() && max_width >= 0.0 && max_height.is_finite() && max_height >= 0.0)
    {
        return Err(EngineError::InvalidConfig(format!(
            "chart size must be finite and non-negative, got {max_width}x{max_height}"
        )));
    }
    Ok(())
}

/// Maps (sample offset, elevation) pairs into chart space.
struct ProfileScale {
    min: f64,
    range: f64,
    step_x: f64,
    max_height: f64,
}

impl ProfileScale {
    /// `None` for an empty series.
    #[allow(clippy::cast_precision_loss)]
    fn fit(samples: &[f64], max_width: f64, max_height: f64) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((first, first), |(lo, hi), &e| (lo.min(e), hi.max(e)));
        let step_x = if rest.is_empty() {
            0.0
        } else {
            max_width / rest.len() as f64
        };
        Some(Self {
            min,
            range: max - min,
            step_x,
            max_height,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn point(&self, offset: usize, elevation: f64) -> ChartPoint {
        let normalized = if self.range > 0.0 {
            (elevation - self.min) / self.range
        } else {
            0.0
        };
        ChartPoint::new(
            offset as f64 * self.step_x,
            normalized.mul_add(-self.max_height, self.max_height),
        )
    }
}
