//! Helper functions and utilities
//!
//! Date formatting and parsing shared by the models and the views.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Where an event sits relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTiming {
    Past,
    Today,
    Upcoming,
}

impl EventTiming {
    pub fn label(&self) -> &'static str {
        match self {
            EventTiming::Past => "Past Event",
            EventTiming::Today => "Today",
            EventTiming::Upcoming => "Upcoming",
        }
    }
}

/// Classify an event date against `now`.
///
/// An event that already started counts as past even if it is on the same day.
pub fn event_timing(event_date: DateTime<Utc>, now: DateTime<Utc>) -> EventTiming {
    if event_date < now {
        EventTiming::Past
    } else if event_date.date_naive() == now.date_naive() {
        EventTiming::Today
    } else {
        EventTiming::Upcoming
    }
}

/// Format an event date for display, e.g. `Jun 01, 2025 at 6:00 PM`
pub fn format_event_date(date: DateTime<Utc>) -> String {
    date.format("%b %d, %Y at %-I:%M %p").to_string()
}

/// Format a date without the time, e.g. `Jun 01, 2025`
pub fn format_short_date(date: DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Format a timestamp relative to `now` ("in 3 days", "2 hours ago")
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = timestamp.signed_duration_since(now);
    let future = diff > Duration::zero();
    let abs = if future { diff } else { -diff };

    let amount = if abs < Duration::minutes(1) {
        return "just now".to_string();
    } else if abs < Duration::hours(1) {
        plural(abs.num_minutes(), "minute")
    } else if abs < Duration::days(1) {
        plural(abs.num_hours(), "hour")
    } else {
        plural(abs.num_days(), "day")
    };

    if future {
        format!("in {}", amount)
    } else {
        format!("{} ago", amount)
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Parse a timestamp as the backend and users write them.
///
/// Accepts RFC 3339, RFC 2822, and naive `YYYY-MM-DDTHH:MM[:SS[.f]]` or
/// `YYYY-MM-DD HH:MM[:SS]` forms (interpreted as UTC), plus a bare date
/// (midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
