//! Time formatting for playhead and trim displays.

/// Format seconds as `m:ss`, truncating fractional seconds.
///
/// Negative and non-finite inputs format as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a `[start, end]` span as `m:ss - m:ss (N.Ns)`.
pub fn format_span(start: f64, end: f64) -> String {
    format!(
        "{} - {} ({:.1}s)",
        format_time(start),
        format_time(end),
        (end - start).max(0.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn test_format_time_rejects_garbage() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(2.0, 8.0), "0:02 - 0:08 (6.0s)");
    }
}
