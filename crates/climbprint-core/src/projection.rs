//! Geographic projection: fit a route into a bounded drawing area.
//!
//! This module defines the [`GeoProjector`] trait for pluggable projection
//! strategies and the [`GeoProjection`] enum for selecting one at runtime.
//!
//! Both strategies treat longitude as `x` and latitude as `y` (an
//! equirectangular view of the route's bounding box), preserve the aspect
//! ratio with a single uniform scale, and flip the vertical axis so north
//! is up in a top-left-origin coordinate space.
//!
//! A route whose points all share a latitude (or longitude, or both) has a
//! zero-size axis. That axis never contributes to the scale and its
//! content is centered, so degenerate input cannot divide by zero.

use geo::BoundingRect;
use serde::{Deserialize, Serialize};

use crate::types::{ChartPoint, EngineError, GeoPoint};

/// Axis-aligned bounding box of a set of geographic points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Compute the bounds of `points`, or `None` when there are none.
    #[must_use]
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let multi: geo::MultiPoint<f64> = points
            .iter()
            .map(|p| geo::Point::new(p.lng, p.lat))
            .collect();
        multi.bounding_rect().map(|rect| Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// North-south extent in degrees (never negative).
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// East-west extent in degrees (never negative).
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

/// A projected route together with the size of the area it was fitted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedTrace {
    /// Projected points, in input order.
    pub points: Vec<ChartPoint>,
    /// Width of the drawing area.
    pub width: f64,
    /// Height of the drawing area.
    pub height: f64,
}

/// Selects how a route is fitted into its drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeoProjection {
    /// Fit into an exact canvas, letterboxing or pillarboxing the shorter
    /// axis so the route is centered.
    CanvasFit { width: f64, height: f64 },

    /// Size the drawing area from the route's own aspect ratio: the longer
    /// axis becomes `max_dimension`, and `padding` is added on all sides.
    AutoSize { max_dimension: f64, padding: f64 },
}

/// Trait for geographic projection strategies.
pub trait GeoProjector {
    /// Project `points` into the strategy's drawing area.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for unusable target sizes and
    /// [`EngineError::NonFiniteCoordinate`] for NaN/infinite coordinates.
    fn project(&self, points: &[GeoPoint]) -> Result<ProjectedTrace, EngineError>;
}

impl GeoProjection {
    /// Check that the target dimensions describe a usable drawing area.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            Self::CanvasFit { width, height } => {
                if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
                    return Err(EngineError::InvalidConfig(format!(
                        "canvas size must be finite and positive, got {width}x{height}"
                    )));
                }
            }
            Self::AutoSize {
                max_dimension,
                padding,
            } => {
                if !(padding.is_finite() && padding >= 0.0) {
                    return Err(EngineError::InvalidConfig(format!(
                        "padding must be finite and non-negative, got {padding}"
                    )));
                }
                if !(max_dimension.is_finite() && max_dimension > 2.0 * padding) {
                    return Err(EngineError::InvalidConfig(format!(
                        "max dimension {max_dimension} leaves no room inside padding {padding}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GeoProjector for GeoProjection {
    fn project(&self, points: &[GeoPoint]) -> Result<ProjectedTrace, EngineError> {
        self.validate()?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(EngineError::NonFiniteCoordinate { index });
        }

        let Some(bounds) = Bounds::from_points(points) else {
            let (width, height) = match *self {
                Self::CanvasFit { width, height } => (width, height),
                Self::AutoSize { padding, .. } => (2.0 * padding, 2.0 * padding),
            };
            return Ok(ProjectedTrace {
                points: Vec::new(),
                width,
                height,
            });
        };

        Ok(match *self {
            Self::CanvasFit { width, height } => canvas_fit(points, bounds, width, height),
            Self::AutoSize {
                max_dimension,
                padding,
            } => auto_size(points, bounds, max_dimension, padding),
        })
    }
}

/// Letterbox/pillarbox fit into an exact `width` x `height` canvas.
fn canvas_fit(points: &[GeoPoint], bounds: Bounds, width: f64, height: f64) -> ProjectedTrace {
    let data_width = bounds.lng_span();
    let data_height = bounds.lat_span();

    let scale = match (data_width > 0.0, data_height > 0.0) {
        (true, true) => (width / data_width).min(height / data_height),
        (true, false) => width / data_width,
        (false, true) => height / data_height,
        (false, false) => 1.0,
    };
    let x_offset = data_width.mul_add(-scale, width) / 2.0;
    let y_offset = data_height.mul_add(-scale, height) / 2.0;

    let projected = points
        .iter()
        .map(|p| {
            let x = (p.lng - bounds.min_lng).mul_add(scale, x_offset);
            let y = height - (p.lat - bounds.min_lat).mul_add(scale, y_offset);
            ChartPoint::new(x, y)
        })
        .collect();

    ProjectedTrace {
        points: projected,
        width,
        height,
    }
}

/// Size the drawing area from the route's aspect ratio.
fn auto_size(points: &[GeoPoint], bounds: Bounds, max_dimension: f64, padding: f64) -> ProjectedTrace {
    let inner = 2.0f64.mul_add(-padding, max_dimension);
    let data_width = bounds.lng_span();
    let data_height = bounds.lat_span();

    let (scale, width, height) = if data_width > data_height {
        let scale = inner / data_width;
        (scale, max_dimension, data_height.mul_add(scale, 2.0 * padding))
    } else if data_height > 0.0 {
        let scale = inner / data_height;
        (scale, data_width.mul_add(scale, 2.0 * padding), max_dimension)
    } else {
        (1.0, 2.0 * padding, 2.0 * padding)
    };

    let projected = points
        .iter()
        .map(|p| {
            ChartPoint::new(
                (p.lng - bounds.min_lng).mul_add(scale, padding),
                (bounds.max_lat - p.lat).mul_add(scale, padding),
            )
        })
        .collect();

    ProjectedTrace {
        points: projected,
        width,
        height,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()
    }

    fn assert_point(p: ChartPoint, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < EPS && (p.y - y).abs() < EPS,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y,
        );
    }

    // --- Bounds ---

    #[test]
    fn bounds_of_empty_is_none() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn bounds_cover_all_points() {
        let b = Bounds::from_points(&pts(&[(45.0, 6.0), (44.5, 6.5), (45.2, 5.9)])).unwrap();
        assert!((b.min_lat - 44.5).abs() < EPS);
        assert!((b.max_lat - 45.2).abs() < EPS);
        assert!((b.min_lng - 5.9).abs() < EPS);
        assert!((b.max_lng - 6.5).abs() < EPS);
    }

    // --- Canvas fit ---

    #[test]
    fn canvas_fit_wide_route_letterboxes() {
        // 2 degrees wide, 1 degree tall into a 100x100 canvas:
        // scale = 50, content height 50, 25 px bands top and bottom.
        let projection = GeoProjection::CanvasFit {
            width: 100.0,
            height: 100.0,
        };
        let trace = projection
            .project(&pts(&[(0.0, 0.0), (1.0, 2.0)]))
            .unwrap();
        assert_point(trace.points[0], 0.0, 75.0);
        assert_point(trace.points[1], 100.0, 25.0);
        assert!((trace.width - 100.0).abs() < EPS);
    }

    #[test]
    fn canvas_fit_tall_route_pillarboxes() {
        let projection = GeoProjection::CanvasFit {
            width: 200.0,
            height: 100.0,
        };
        let trace = projection
            .project(&pts(&[(0.0, 0.0), (2.0, 1.0)]))
            .unwrap();
        // scale = 50, content width 50, offset 75 on each side.
        assert_point(trace.points[0], 75.0, 100.0);
        assert_point(trace.points[1], 125.0, 0.0);
    }

    #[test]
    fn canvas_fit_north_is_up() {
        let projection = GeoProjection::CanvasFit {
            width: 10.0,
            height: 10.0,
        };
        let trace = projection
            .project(&pts(&[(10.0, 0.0), (0.0, 0.0)]))
            .unwrap();
        assert!(trace.points[0].y < trace.points[1].y);
    }

    #[test]
    fn canvas_fit_single_point_is_centered() {
        let projection = GeoProjection::CanvasFit {
            width: 80.0,
            height: 40.0,
        };
        let trace = projection.project(&pts(&[(45.0, 7.0)])).unwrap();
        assert_point(trace.points[0], 40.0, 20.0);
    }

    #[test]
    fn canvas_fit_east_west_line_is_vertically_centered() {
        let projection = GeoProjection::CanvasFit {
            width: 100.0,
            height: 50.0,
        };
        let trace = projection
            .project(&pts(&[(45.0, 7.0), (45.0, 8.0)]))
            .unwrap();
        assert_point(trace.points[0], 0.0, 25.0);
        assert_point(trace.points[1], 100.0, 25.0);
    }

    #[test]
    fn canvas_fit_empty_input() {
        let projection = GeoProjection::CanvasFit {
            width: 10.0,
            height: 20.0,
        };
        let trace = projection.project(&[]).unwrap();
        assert!(trace.points.is_empty());
        assert!((trace.height - 20.0).abs() < EPS);
    }

    #[test]
    fn canvas_fit_rejects_zero_canvas() {
        let projection = GeoProjection::CanvasFit {
            width: 0.0,
            height: 20.0,
        };
        assert!(matches!(
            projection.project(&pts(&[(0.0, 0.0)])),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let projection = GeoProjection::CanvasFit {
            width: 10.0,
            height: 10.0,
        };
        let err = projection
            .project(&pts(&[(0.0, 0.0), (f64::NAN, 1.0)]))
            .unwrap_err();
        assert_eq!(err, EngineError::NonFiniteCoordinate { index: 1 });
    }

    // --- Auto size ---

    #[test]
    fn auto_size_wide_route() {
        // 4 degrees wide, 1 tall; max 100 with padding 10 → inner 80, scale 20.
        let projection = GeoProjection::AutoSize {
            max_dimension: 100.0,
            padding: 10.0,
        };
        let trace = projection
            .project(&pts(&[(0.0, 0.0), (1.0, 4.0)]))
            .unwrap();
        assert!((trace.width - 100.0).abs() < EPS);
        assert!((trace.height - 40.0).abs() < EPS);
        assert_point(trace.points[0], 10.0, 30.0);
        assert_point(trace.points[1], 90.0, 10.0);
    }

    #[test]
    fn auto_size_tall_route() {
        let projection = GeoProjection::AutoSize {
            max_dimension: 100.0,
            padding: 10.0,
        };
        let trace = projection
            .project(&pts(&[(0.0, 0.0), (4.0, 1.0)]))
            .unwrap();
        assert!((trace.width - 40.0).abs() < EPS);
        assert!((trace.height - 100.0).abs() < EPS);
        assert_point(trace.points[1], 30.0, 10.0);
    }

    #[test]
    fn auto_size_single_point_sits_on_padding() {
        let projection = GeoProjection::AutoSize {
            max_dimension: 100.0,
            padding: 12.0,
        };
        let trace = projection.project(&pts(&[(45.0, 7.0), (45.0, 7.0)])).unwrap();
        assert_point(trace.points[0], 12.0, 12.0);
        assert!((trace.width - 24.0).abs() < EPS);
        assert!((trace.height - 24.0).abs() < EPS);
    }

    #[test]
    fn auto_size_rejects_padding_larger_than_area() {
        let projection = GeoProjection::AutoSize {
            max_dimension: 20.0,
            padding: 10.0,
        };
        assert!(projection.validate().is_err());
    }

    #[test]
    fn auto_size_rejects_negative_padding() {
        let projection = GeoProjection::AutoSize {
            max_dimension: 20.0,
            padding: -1.0,
        };
        assert!(projection.validate().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn canvas_fit_stays_inside_and_touches_binding_axis(
                coords in prop::collection::vec((-60.0..60.0_f64, -170.0..170.0_f64), 2..40),
                width in 10.0..2000.0_f64,
                height in 10.0..2000.0_f64,
            ) {
                let points = pts(&coords);
                let bounds = Bounds::from_points(&points).unwrap();
                prop_assume!(bounds.lat_span() > 1e-6 && bounds.lng_span() > 1e-6);

                let trace = GeoProjection::CanvasFit { width, height }.project(&points).unwrap();
                let tol = 1e-9 * width.max(height);
                for p in &trace.points {
                    prop_assert!(p.x >= -tol && p.x <= width + tol, "x {} outside 0..{}", p.x, width);
                    prop_assert!(p.y >= -tol && p.y <= height + tol, "y {} outside 0..{}", p.y, height);
                }

                let (lo, hi, extent) = if width / bounds.lng_span() <= height / bounds.lat_span() {
                    let xs = trace.points.iter().map(|p| p.x);
                    (xs.clone().fold(f64::INFINITY, f64::min), xs.fold(f64::NEG_INFINITY, f64::max), width)
                } else {
                    let ys = trace.points.iter().map(|p| p.y);
                    (ys.clone().fold(f64::INFINITY, f64::min), ys.fold(f64::NEG_INFINITY, f64::max), height)
                };
                prop_assert!(lo.abs() <= tol);
                prop_assert!((hi - extent).abs() <= tol);
            }
        }
    }
}
