//! Climb categorization and power averaging.

use crate::types::ClimbCategory;

/// Score thresholds, hardest first. A climb belongs to the first category
/// whose threshold its score strictly exceeds.
const CATEGORY_THRESHOLDS: [(f64, ClimbCategory); 5] = [
    (8000.0, ClimbCategory::Hc),
    (4000.0, ClimbCategory::Cat1),
    (2000.0, ClimbCategory::Cat2),
    (1000.0, ClimbCategory::Cat3),
    (500.0, ClimbCategory::Cat4),
];

/// Categorize a climb from its length and elevation gain.
///
/// The score is `gain_m * length_km`.
///
/// # Examples
///
/// ```
/// use climbprint_core::classify::classify;
/// use climbprint_core::ClimbCategory;
///
/// // 10 km gaining 900 m scores 9000.
/// assert_eq!(classify(10_000.0, 900.0), ClimbCategory::Hc);
/// assert_eq!(classify(500.0, 20.0), ClimbCategory::Uncategorized);
/// ```
#[must_use]
pub fn classify(length_m: f64, elevation_gain_m: f64) -> ClimbCategory {
    let score = elevation_gain_m * (length_m / 1000.0);
    CATEGORY_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score > *threshold)
        .map_or(ClimbCategory::Uncategorized, |&(_, category)| category)
}

/// Average power over `start..=end`, weighting each sample by the time
/// elapsed since the previous one.
///
/// Sample `i` contributes `power[i] * dt` only when `dt = time[i] -
/// time[i - 1]` is positive and `power[i]` is positive, which skips
/// clock jumps backwards and zero/negative sentinel readings. Samples
/// missing from either stream contribute nothing. Returns 0 when no time
/// was accumulated, including when `power` is empty.
#[must_use]
pub fn time_weighted_average_power(power: &[f64], time: &[f64], start: usize, end: usize) -> f64 {
    let mut weighted = 0.0;
    let mut duration = 0.0;

    for i in start.saturating_add(1)..=end {
        let (Some(&watts), Some(&t), Some(&prev)) =
            (power.get(i), time.get(i), time.get(i - 1))
        else {
            break;
        };
        let dt = t - prev;
        if dt > 0.0 && watts > 0.0 {
            weighted = watts.mul_add(dt, weighted);
            duration += dt;
        }
    }

    if duration > 0.0 {
        weighted / duration
    } else {
        0.0
    }
}
