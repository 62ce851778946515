/*!
 * WebVTT timestamp formatting.
 *
 * Timestamps render as `HH:MM:SS.mmm`. The hour field is zero-padded to two
 * digits and widens past 99 hours instead of wrapping.
 */

use std::time::Duration;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const NANOS_PER_MILLI: u128 = 1_000_000;

/// Convert fractional seconds to whole nanoseconds.
///
/// Rounds to the nearest nanosecond so values such as `0.8999999999999999`
/// land on `900ms` instead of one millisecond early. Negative, NaN and
/// infinite inputs clamp to zero. The result is wide enough for any hour
/// count a caption file can realistically hold; only values past roughly
/// 1e22 years saturate.
pub fn seconds_to_nanos(seconds: f64) -> u128 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * NANOS_PER_SEC).round() as u128
}

/// Format a nanosecond offset as a WebVTT timestamp, truncating to whole milliseconds
pub fn format_nanos(nanos: u128) -> String {
    let ms = nanos / NANOS_PER_MILLI;
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1_000) % 60;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Format a duration as a WebVTT timestamp
pub fn format_duration(duration: Duration) -> String {
    format_nanos(duration.as_nanos())
}

/// Format fractional seconds as a WebVTT timestamp
pub fn format_seconds(seconds: f64) -> String {
    format_nanos(seconds_to_nanos(seconds))
}
