//! climbprint-core: Pure activity geometry and climb segmentation (sans-IO).
//!
//! Turns recorded activity streams into drawable data:
//! elevation/distance -> climb detection -> classification and power
//! averaging -> profile charts with climb regions highlighted, plus
//! encoded route polylines -> fitted route traces.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! slices and returns plain, serializable values. Fetching activities,
//! rendering and persistence live outside it.

pub mod classify;
pub mod climbs;
pub mod config;
pub mod elevation;
pub mod format;
pub mod gradient;
pub mod polyline;
pub mod projection;
pub mod types;

use serde::{Deserialize, Serialize};

pub use climbs::ClimbParams;
pub use config::{ChartConfig, EngineConfig};
pub use elevation::{ChartExtent, ChartRegion};
pub use gradient::{Color, GradientStyle, StopSide, TwoStopGradient};
pub use polyline::PolylineFault;
pub use projection::{Bounds, GeoProjection, GeoProjector, ProjectedTrace};
pub use types::{
    ActivityStreams, ChartPoint, ClimbCategory, ClimbSummary, EngineError, GeoPoint, IndexSpan,
    StreamKind,
};

/// A climb's own profile chart, sized relative to the activity's other
/// climbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbChart {
    pub extent: ChartExtent,
    pub points: Vec<ChartPoint>,
}

/// Everything derived from one activity's streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysis {
    /// Accepted climbs, ordered by start index.
    pub climbs: Vec<ClimbSummary>,

    /// Full elevation profile as one polyline.
    pub profile: Vec<ChartPoint>,

    /// Full elevation profile split into regions, one highlighted region
    /// per climb. Empty when the activity has fewer than two samples.
    pub regions: Vec<ChartRegion>,

    /// One chart per entry of `climbs`, in the same order.
    pub climb_charts: Vec<ClimbChart>,
}

/// Run climb detection and chart projection over an activity.
///
/// # Steps
///
/// 1. Validate `config`
/// 2. Detect and summarize climbs
/// 3. Project the full elevation profile
/// 4. Project the profile again as regions highlighting each climb
/// 5. Project each climb on its own, scaled against the largest climb
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if any section of `config` is
/// invalid. Degenerate activities (empty, flat, no climbs) are not errors.
///
/// # Examples
///
/// ```
/// use climbprint_core::{ActivityStreams, EngineConfig, analyze};
///
/// let distance: Vec<f64> = (0..=20).map(|i| f64::from(i) * 100.0).collect();
/// // Up 1 km at 8%, then back down.
/// let elevation: Vec<f64> = (0..=20).map(|i: i32| f64::from(10 - (i - 10).abs()) * 8.0).collect();
/// let streams = ActivityStreams::new(vec![], distance, elevation, vec![]).unwrap();
///
/// let analysis = analyze(&streams, &EngineConfig::default()).unwrap();
/// assert_eq!(analysis.climbs.len(), 1);
/// assert!(analysis.regions.iter().any(|r| r.highlighted));
/// ```
pub fn analyze(
    streams: &ActivityStreams,
    config: &EngineConfig,
) -> Result<ActivityAnalysis, EngineError> {
    config.validate()?;
    let ChartConfig {
        width,
        height,
        stride,
    } = config.chart;

    let climbs = climbs::detect(streams, &config.climbs)?;
    let elevations = streams.elevation();
    let profile = elevation::project(elevations, width, height, stride)?;

    let regions = match elevations.len() {
        0 | 1 => Vec::new(),
        n => {
            let highlights: Vec<IndexSpan> = climbs.iter().map(ClimbSummary::span).collect();
            elevation::project_slice(
                elevations,
                IndexSpan::new(0, n - 1),
                &highlights,
                width,
                height,
                stride,
            )?
        }
    };

    let climb_charts = elevation::climb_chart_extents(&climbs, width, height)
        .into_iter()
        .zip(&climbs)
        .map(|(extent, climb)| -> Result<ClimbChart, EngineError> {
            let points = elevation::project_slice(
                elevations,
                climb.span(),
                &[],
                extent.width,
                extent.height,
                stride,
            )?
            .into_iter()
            .flat_map(|region| region.points)
            .collect();
            Ok(ClimbChart { extent, points })
        })
        .collect::<Result<_, _>>()?;

    tracing::debug!(
        samples = streams.len(),
        climbs = climbs.len(),
        profile_points = profile.len(),
        regions = regions.len(),
        "activity analyzed"
    );

    Ok(ActivityAnalysis {
        climbs,
        profile,
        regions,
        climb_charts,
    })
}

/// Decode an encoded route polyline and fit it with `config.route`.
///
/// # Errors
///
/// Returns [`EngineError::MalformedPolyline`] if the polyline cannot be
/// decoded, or [`EngineError::InvalidConfig`] if the route projection is
/// unusable.
pub fn trace_route(encoded: &str, config: &EngineConfig) -> Result<ProjectedTrace, EngineError> {
    let points = polyline::decode(encoded)?;
    config.route.project(&points)
}
