use crate::TimeMs;

/// Formats a playhead position for the time label: `M:SS`, or `H:MM:SS` from one hour.
/// Negative values render as zero.
pub fn format_timestamp(time_ms: TimeMs) -> String {
    let total_secs = time_ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
