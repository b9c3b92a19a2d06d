//! Clock-face formatting for timer displays.

/// `MM:SS`, with a leading `-` in rest overtime.
///
/// Minutes are not wrapped into hours: 3725 seconds is `62:05`.
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// Overtime label: the magnitude of a negative display, unsigned.
/// Returns `None` while the interval is not overrun.
pub fn format_overtime(seconds: i64) -> Option<String> {
    (seconds < 0).then(|| format_clock(-seconds))
}

/// Whole-workout elapsed time: `H:MM:SS` from one hour, `M:SS` below.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
