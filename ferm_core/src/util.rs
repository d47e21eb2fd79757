//! Common time helpers for ferm_core.

use chrono::{DateTime, Utc};
use ferm_traits::Timestamp;

/// Length in seconds of `duration` programme units, rounded to the nearest second.
/// Negative or non-finite durations count as zero.
#[inline]
pub fn step_seconds(duration: f32, unit_seconds: u32) -> i64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (f64::from(duration) * f64::from(unit_seconds)).round() as i64
}

/// Render a timestamp as `2024-05-01 12:00:00 UTC` for logs and replies.
pub fn format_ts(ts: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{ts}"),
    }
}
