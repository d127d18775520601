use std::time::Duration;

/// Format a lap time for display, e.g. `1:27.452`.
///
/// A zero hours component is dropped, the minutes carry no leading zero and
/// the fraction is truncated (not rounded) to milliseconds. Durations with
/// no sub-second part print without a fraction.
pub fn format_lap_time(lap: Duration) -> String {
    let total = lap.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    };
    if lap.subsec_nanos() > 0 {
        out.push_str(&format!(".{:03}", lap.subsec_millis()));
    }
    out
}
