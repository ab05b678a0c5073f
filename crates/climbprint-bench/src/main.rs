//! climbprint-bench: CLI tool for climb detection parameter experimentation.
//!
//! Runs the engine on an activity JSON file with configurable parameters,
//! printing the detected climbs and chart statistics. Useful for:
//!
//! - Tuning the minimum gradient, minimum length and dip tolerance
//! - Checking how chart size and stride affect profile point counts
//! - Verifying that an encoded route polyline decodes and fits
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin climbprint-bench -- [OPTIONS] <ACTIVITY_JSON>
//! ```
//!
//! The activity file holds `distance` and `elevation` arrays, optional
//! `time` and `power` arrays of the same length, and an optional encoded
//! route `polyline`. Set `RUST_LOG=climbprint_core=debug` to see rejected
//! climb candidates.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use climbprint_core::format::format_duration_hm;
use climbprint_core::{
    ActivityAnalysis, ActivityStreams, ChartConfig, ClimbParams, EngineConfig, GeoProjection,
    ProjectedTrace,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Climb detection and chart projection experimentation for climbprint.
///
/// Runs the engine on an activity file with configurable parameters and
/// prints the detected climbs and chart statistics.
#[derive(Parser)]
#[command(name = "climbprint-bench", version)]
struct Cli {
    /// Path to the activity JSON file.
    activity_path: PathBuf,

    /// Gradient (percent) that opens a climb and that its average must reach.
    #[arg(long, default_value_t = ClimbParams::DEFAULT_MIN_GRADIENT_PERCENT)]
    min_gradient: f64,

    /// Minimum climb length in meters.
    #[arg(long, default_value_t = ClimbParams::DEFAULT_MIN_LENGTH_M)]
    min_length: f64,

    /// Gradient (percent) an open climb tolerates before closing.
    #[arg(long, default_value_t = ClimbParams::DEFAULT_DIP_TOLERANCE_PERCENT, allow_negative_numbers = true)]
    dip_tolerance: f64,

    /// Elevation chart width.
    #[arg(long, default_value_t = ChartConfig::DEFAULT_WIDTH)]
    chart_width: f64,

    /// Elevation chart height.
    #[arg(long, default_value_t = ChartConfig::DEFAULT_HEIGHT)]
    chart_height: f64,

    /// Keep every Nth sample in charts.
    #[arg(long, default_value_t = ChartConfig::DEFAULT_STRIDE, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    stride: usize,

    /// Longer side of the route drawing area.
    #[arg(long, default_value_t = EngineConfig::DEFAULT_ROUTE_SIZE)]
    route_size: f64,

    /// Padding around the route.
    #[arg(long, default_value_t = EngineConfig::DEFAULT_ROUTE_PADDING)]
    route_padding: f64,

    /// Output results as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full engine config as a JSON string.
    ///
    /// When provided, all other parameter flags are ignored.
    /// The JSON must be a valid `EngineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// On-disk activity: the streams plus an optional route.
#[derive(Deserialize)]
struct ActivityFile {
    #[serde(flatten)]
    streams: ActivityStreams,
    #[serde(default)]
    polyline: Option<String>,
}

/// Everything printed with `--json`.
#[derive(Serialize)]
struct BenchOutput<'a> {
    config: &'a EngineConfig,
    analysis: &'a ActivityAnalysis,
    route: Option<&'a ProjectedTrace>,
}

/// Build an [`EngineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<EngineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(EngineConfig {
        climbs: ClimbParams {
            min_gradient_percent: cli.min_gradient,
            min_length_m: cli.min_length,
            dip_tolerance_percent: cli.dip_tolerance,
        },
        chart: ChartConfig {
            width: cli.chart_width,
            height: cli.chart_height,
            stride: cli.stride,
        },
        route: GeoProjection::AutoSize {
            max_dimension: cli.route_size,
            padding: cli.route_padding,
        },
    })
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let activity: ActivityFile = match std::fs::read_to_string(&cli.activity_path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(activity) => activity,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.activity_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Activity: {} ({} samples{})",
        cli.activity_path.display(),
        activity.streams.len(),
        if activity.streams.has_power() {
            ", with power"
        } else {
            ""
        },
    );
    eprintln!("Config: {config:#?}");
    eprintln!();

    let analysis = match climbprint_core::analyze(&activity.streams, &config) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("Engine error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let route = match activity
        .polyline
        .as_deref()
        .map(|encoded| climbprint_core::trace_route(encoded, &config))
        .transpose()
    {
        Ok(route) => route,
        Err(e) => {
            eprintln!("Route error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        let output = BenchOutput {
            config: &config,
            analysis: &analysis,
            route: route.as_ref(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing results: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report(&activity.streams, &analysis, route.as_ref()));
    }

    ExitCode::SUCCESS
}

/// Human-readable summary of one analysis.
fn report(
    streams: &ActivityStreams,
    analysis: &ActivityAnalysis,
    route: Option<&ProjectedTrace>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Climbs ({})\n{}", analysis.climbs.len(), "=".repeat(72));
    let _ = writeln!(
        out,
        "{:>4} {:>13} {:>9} {:>8} {:>7} {:>7} {:>9} {:>4}",
        "#", "Samples", "Length", "Gain", "Avg", "Power", "Time", "Cat",
    );
    let _ = writeln!(out, "{}", "-".repeat(72));

    let time = streams.time();
    for (n, climb) in analysis.climbs.iter().enumerate() {
        let duration = match (time.get(climb.start_index), time.get(climb.end_index)) {
            (Some(start), Some(end)) => format_duration_hm(end - start),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>4} {:>13} {:>7.2}km {:>7.1}m {:>6.1}% {:>6.0}W {:>9} {:>4}",
            n + 1,
            format!("{}..={}", climb.start_index, climb.end_index),
            climb.length_m / 1000.0,
            climb.elevation_gain_m,
            climb.average_gradient_percent,
            climb.average_power_watts,
            duration,
            climb.category,
        );
    }

    let highlighted = analysis.regions.iter().filter(|r| r.highlighted).count();
    let _ = writeln!(out);
    let _ = writeln!(out, "Profile: {} points", analysis.profile.len());
    let _ = writeln!(
        out,
        "Regions: {} ({highlighted} highlighted, {} points)",
        analysis.regions.len(),
        analysis.regions.iter().map(|r| r.points.len()).sum::<usize>(),
    );

    match route {
        Some(trace) => {
            let _ = writeln!(
                out,
                "Route: {} points in {:.1} x {:.1}",
                trace.points.len(),
                trace.width,
                trace.height,
            );
        }
        None => {
            let _ = writeln!(out, "Route: none");
        }
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("climbprint-bench").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_build_config() {
        let config = config_from_cli(&cli(&[
            "activity.json",
            "--min-gradient",
            "5",
            "--dip-tolerance",
            "-2",
            "--stride",
            "10",
        ]))
        .unwrap();
        assert!((config.climbs.min_gradient_percent - 5.0).abs() < f64::EPSILON);
        assert!((config.climbs.dip_tolerance_percent - -2.0).abs() < f64::EPSILON);
        assert_eq!(config.chart.stride, 10);
        assert_eq!(config.route, EngineConfig::default().route);
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = config_from_cli(&cli(&["activity.json"])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn config_json_overrides_flags() {
        let config = config_from_cli(&cli(&[
            "activity.json",
            "--min-gradient",
            "9",
            "--config-json",
            r#"{"climbs": {"min_length_m": 800}}"#,
        ]))
        .unwrap();
        assert!((config.climbs.min_gradient_percent - 4.0).abs() < f64::EPSILON);
        assert!((config.climbs.min_length_m - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let err = config_from_cli(&cli(&["activity.json", "--config-json", "{"])).unwrap_err();
        assert!(err.starts_with("Error parsing --config-json"));
    }

    #[test]
    fn zero_stride_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["climbprint-bench", "a.json", "--stride", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn activity_file_reads_optional_fields() {
        let activity: ActivityFile =
            serde_json::from_str(r#"{"distance": [0, 100], "elevation": [10, 20]}"#).unwrap();
        assert_eq!(activity.streams.len(), 2);
        assert!(activity.polyline.is_none());
    }

    #[test]
    fn report_lists_climbs() {
        let distance: Vec<f64> = (0..=12).map(|i| f64::from(i) * 100.0).collect();
        let elevation: Vec<f64> = (0..=12).map(|i: i32| f64::from(6 - (i - 6).abs()) * 7.0).collect();
        let time: Vec<f64> = (0..=12).map(|i| f64::from(i) * 60.0).collect();
        let streams = ActivityStreams::new(time, distance, elevation, vec![]).unwrap();
        let analysis = climbprint_core::analyze(&streams, &EngineConfig::default()).unwrap();

        let text = report(&streams, &analysis, None);
        assert!(text.starts_with("Climbs (1)"));
        assert!(text.contains("0..=6"));
        assert!(text.contains("06m 00s"));
        assert!(text.contains("Route: none"));
    }
}
