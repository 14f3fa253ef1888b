//! Relative time formatting for session listings.

use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Formats a timestamp as a short relative-time string ("just now",
/// "42m ago", "3h ago", "5d ago", or "MM-DD" beyond a week).
pub fn format_relative_time(timestamp: SystemTime) -> String {
    let then: DateTime<Local> = timestamp.into();
    let now = Local::now();
    let diff = now.signed_duration_since(then);

    if diff.num_minutes() < 5 {
        return "just now".to_string();
    }
    if diff.num_hours() < 1 {
        return format!("{}m ago", diff.num_minutes());
    }
    if diff.num_days() < 1 {
        return format!("{}h ago", diff.num_hours());
    }
    if diff.num_days() < 7 {
        return format!("{}d ago", diff.num_days());
    }
    then.format("%m-%d").to_string()
}
