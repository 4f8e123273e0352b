use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const ELLIPSIS: &str = "...";

const DATE_TIME_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";
const DATE_FORMAT: &str = "%B %-d, %Y";

/// Renders an ISO-8601 date or timestamp as "October 15, 2026 at 3:30 PM".
/// Timestamps keep the offset they were written with. Input that does not
/// parse is returned unchanged.
pub fn format_appointment_date(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return timestamp.format(DATE_TIME_FORMAT).to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return local.format(DATE_TIME_FORMAT).to_string();
        }
    }

    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// First `limit` characters of `text` followed by the ellipsis marker.
/// The marker is appended even when nothing was cut.
pub fn message_snippet(text: &str, limit: usize) -> String {
    let mut snippet: String = text.chars().take(limit).collect();
    snippet.push_str(ELLIPSIS);
    snippet
}
