//! Formatting helpers for session timers.

/// Formats seconds as `MM:SS`. Negative input is clamped to `00:00`.
///
/// Minutes are not wrapped into hours, so an hour-long reading shows `60:00`.
#[must_use]
pub fn format_clock(total_seconds: i64) -> String {
    let clamped = total_seconds.max(0);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Formats an unsigned elapsed duration as `MM:SS`.
#[must_use]
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// Remaining time under two minutes is shown as urgent.
#[must_use]
pub fn is_urgent(remaining_seconds: i64) -> bool {
    remaining_seconds < 120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_clamps() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(format_clock(-30), "00:00");
        assert_eq!(format_elapsed(599), "09:59");
    }

    #[test]
    fn urgency_threshold() {
        assert!(is_urgent(119));
        assert!(!is_urgent(120));
        assert!(is_urgent(-1));
    }
}
