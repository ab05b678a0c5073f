//! Integration test: run the two-climbs sample activity through the full engine.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;

use climbprint_core::{
    ActivityStreams, ClimbCategory, EngineConfig, GradientStyle, StopSide, TwoStopGradient,
    analyze, trace_route,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct ActivityFile {
    #[serde(flatten)]
    streams: ActivityStreams,
    polyline: String,
}

fn load() -> ActivityFile {
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let path = workspace_root.join("assets/activities/two-climbs.json");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("sample activity should deserialize")
}

/// `0 <= value <= limit`, up to rounding.
fn within(value: f64, limit: f64) -> bool {
    value >= -1e-9 && value <= limit + 1e-9
}

#[test]
fn detects_both_climbs() {
    let activity = load();
    assert_eq!(activity.streams.len(), 661);

    let analysis = analyze(&activity.streams, &EngineConfig::default()).unwrap();
    assert_eq!(analysis.climbs.len(), 2, "climbs: {:#?}", analysis.climbs);

    // 5 km at 9% with one shallow dip that must not split it.
    let long = &analysis.climbs[0];
    assert_eq!((long.start_index, long.end_index), (100, 350));
    assert!((long.length_m - 5000.0).abs() < 1e-6);
    assert!((long.elevation_gain_m - 448.2).abs() < 1e-6);
    assert_eq!(long.category, ClimbCategory::Cat2);
    assert!((long.average_power_watts - 310.0).abs() < 1e-6);

    let short = &analysis.climbs[1];
    assert_eq!((short.start_index, short.end_index), (550, 610));
    assert!((short.average_gradient_percent - 5.0).abs() < 1e-6);
    assert_eq!(short.category, ClimbCategory::Uncategorized);
}

#[test]
fn regions_cover_the_profile() {
    let activity = load();
    let analysis = analyze(&activity.streams, &EngineConfig::default()).unwrap();

    let spans: Vec<_> = analysis
        .regions
        .iter()
        .map(|r| (r.span.start, r.span.end, r.highlighted))
        .collect();
    assert_eq!(
        spans,
        vec![
            (0, 100, false),
            (100, 350, true),
            (350, 550, false),
            (550, 610, true),
            (610, 660, false),
        ]
    );

    let config = EngineConfig::default();
    for region in &analysis.regions {
        for p in &region.points {
            assert!(within(p.x, config.chart.width), "x = {}", p.x);
            assert!(within(p.y, config.chart.height), "y = {}", p.y);
        }
    }

    // The long climb sets the thumbnail scale for both climbs.
    let [long, short] = analysis.climb_charts.as_slice() else {
        panic!("expected two climb charts");
    };
    assert!((long.extent.width - config.chart.width).abs() < 1e-9);
    assert!(short.extent.width < long.extent.width);
    assert!(short.extent.height < long.extent.height);
}

#[test]
fn region_styles_dim_the_gaps() {
    let activity = load();
    let analysis = analyze(&activity.streams, &EngineConfig::default()).unwrap();
    let style = GradientStyle::new(
        TwoStopGradient::solid("#e4572e"),
        TwoStopGradient::solid("#e4572e80"),
    );

    for region in &analysis.regions {
        let drawn = style.for_region(region.highlighted, GradientStyle::DEFAULT_DECAY);
        let stroke = drawn.stroke().stop(StopSide::Start).unwrap();
        if region.highlighted {
            assert_eq!(stroke, "#e4572e");
        } else {
            assert_eq!(stroke, "#e4572ecc");
        }
    }
}

#[test]
fn route_is_fitted() {
    let activity = load();
    let trace = trace_route(&activity.polyline, &EngineConfig::default()).unwrap();
    assert_eq!(trace.points.len(), 41);
    assert_eq!(trace.points.first(), trace.points.last());
    for p in &trace.points {
        assert!(within(p.x, trace.width), "x = {}", p.x);
        assert!(within(p.y, trace.height), "y = {}", p.y);
    }
}
