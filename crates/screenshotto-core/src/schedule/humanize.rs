//! Relative time phrases ("in 5 minutes", "an hour ago")
//!
//! Thresholds follow the usual humanizing convention: anything under ten
//! seconds is "just now", under 45 seconds is "seconds", and every larger
//! unit starts at 1.5x the previous one ("a minute" from 45 s to 90 s,
//! "N minutes" up to 45 minutes, ...). Months are 30 days and years are 365
//! days.

use chrono::{NaiveDateTime, TimeDelta};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Describes a signed distance in seconds; positive is the future.
///
/// ```
/// use screenshotto_core::schedule::humanize::humanize_seconds;
///
/// assert_eq!(humanize_seconds(3), "just now");
/// assert_eq!(humanize_seconds(30), "in seconds");
/// assert_eq!(humanize_seconds(600), "in 10 minutes");
/// assert_eq!(humanize_seconds(-7200), "2 hours ago");
/// ```
pub fn humanize_seconds(delta: i64) -> String {
    let diff = delta.abs();

    let phrase = if diff < 10 {
        return "just now".to_string();
    } else if diff < 45 {
        "seconds".to_string()
    } else if diff < 90 {
        "a minute".to_string()
    } else if diff < 45 * MINUTE {
        format!("{} minutes", (diff / MINUTE).max(2))
    } else if diff < 90 * MINUTE {
        "an hour".to_string()
    } else if diff < 22 * HOUR {
        format!("{} hours", (diff / HOUR).max(2))
    } else if diff < 36 * HOUR {
        "a day".to_string()
    } else if diff < MONTH {
        format!("{} days", (diff / DAY).max(2))
    } else if diff < 45 * DAY {
        "a month".to_string()
    } else if diff < 345 * DAY {
        format!("{} months", (diff / MONTH).max(2))
    } else if diff < 547 * DAY {
        "a year".to_string()
    } else {
        format!("{} years", (diff / YEAR).max(2))
    };

    if delta < 0 { format!("{phrase} ago") } else { format!("in {phrase}") }
}

/// Humanizes `target` relative to `now`
///
/// The distance is rounded to whole seconds first, so 9.6 s away is "in
/// seconds" rather than "just now".
pub fn humanize(target: NaiveDateTime, now: NaiveDateTime) -> String {
    humanize_seconds(rounded_seconds(target - now))
}

/// Rounds a delta to whole seconds, half away from zero
fn rounded_seconds(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds();
    (millis as f64 / 1000.0).round() as i64
}
