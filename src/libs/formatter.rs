//! Human-readable durations and timestamps.
//!
//! - [`format_seconds`]: break lengths and intervals, e.g. `"20 min"`, `"1 min 30 sec"`
//! - [`format_duration`]: accumulated time as `"HH:MM"`
//! - [`format_countdown`]: time left until a deadline as `"MM:SS"`, or `"H:MM:SS"` past an hour
//!
//! Negative inputs are treated as zero; nothing here panics.

use chrono::{Duration, NaiveDateTime};

/// Formats whole seconds with the largest fitting units, dropping zero parts.
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3_600;
    let minutes = seconds % 3_600 / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} min", minutes));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{} sec", secs));
    }
    parts.join(" ")
}

pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;

    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

pub fn format_countdown(from: NaiveDateTime, to: NaiveDateTime) -> String {
    let total = (to - from).num_seconds().max(0);
    let hours = total / 3_600;
    let minutes = total % 3_600 / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Local clock time of `at`, `HH:MM:SS`.
pub fn format_time(at: NaiveDateTime) -> String {
    at.format("%H:%M:%S").to_string()
}
