//! Human-readable formatting for the extract summary.

/// `950`, `1.2K`, `3.4M`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_count(n: u64) -> String {
    if n < 1_000 {
        n.to_string()
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    }
}

/// `"2 days, 3 hours, 0 minutes, 12 seconds"`. Negative input reads as zero.
pub(crate) fn format_elapsed(seconds: i64) -> String {
    let s = seconds.max(0);
    let days = s / 86_400;
    let hours = (s % 86_400) / 3_600;
    let minutes = (s % 3_600) / 60;
    let secs = s % 60;
    format!("{days} days, {hours} hours, {minutes} minutes, {secs} seconds")
}
