//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Number of milliseconds in a second
pub const MILLIS_PER_SECOND: u32 = 1_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a control cycle period in seconds into the whole number of
/// milliseconds the cycle timers are decremented by.
pub fn period_to_millis(period_s: f64) -> u32 {
    (period_s * MILLIS_PER_SECOND as f64).round().max(0.0) as u32
}
