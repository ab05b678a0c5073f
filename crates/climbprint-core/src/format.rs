//! Human-readable labels for chart annotations.

/// Format a duration in seconds as `"MMm SSs"` below one hour and
/// `"Hh MMm"` from one hour on.
///
/// Fractional seconds are truncated. Negative and non-finite durations
/// format as zero.
///
/// # Examples
///
/// ```
/// use climbprint_core::format::format_duration_hm;
///
/// assert_eq!(format_duration_hm(754.0), "12m 34s");
/// assert_eq!(format_duration_hm(5025.0), "1h 23m");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration_hm(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let secs = total % 60;

    if hours == 0 {
        format!("{minutes:02}m {secs:02}s")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_an_hour_shows_seconds() {
        assert_eq!(format_duration_hm(0.0), "00m 00s");
        assert_eq!(format_duration_hm(59.9), "00m 59s");
        assert_eq!(format_duration_hm(61.0), "01m 01s");
        assert_eq!(format_duration_hm(3599.0), "59m 59s");
    }

    #[test]
    fn hours_drop_seconds() {
        assert_eq!(format_duration_hm(3600.0), "1h 00m");
        assert_eq!(format_duration_hm(3661.0), "1h 01m");
        assert_eq!(format_duration_hm(36_000.0 + 45.0 * 60.0), "10h 45m");
    }

    #[test]
    fn invalid_durations_are_zero() {
        assert_eq!(format_duration_hm(-12.0), "00m 00s");
        assert_eq!(format_duration_hm(f64::NAN), "00m 00s");
        assert_eq!(format_duration_hm(f64::INFINITY), "00m 00s");
    }
}
