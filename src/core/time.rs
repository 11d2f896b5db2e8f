//! Clock Formatting
//!
//! Millisecond wall-clock helpers and the `M:SS` duration formatter used in
//! round broadcasts.

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Format a duration for display.
///
/// Rounds to the nearest whole second, then renders `M:SS` (minutes are not
/// padded, seconds always two digits). Negative durations render as `0:00`.
///
/// ```
/// use egg_hunt::core::time::time_format;
///
/// assert_eq!(time_format(59_000), "0:59");
/// assert_eq!(time_format(125_000), "2:05");
/// ```
pub fn time_format(ms: i64) -> String {
    let secs = ms.max(0).saturating_add(500) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
