//! Date/time utilities for Plaza.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a stored timestamp into a `DateTime<Utc>`.
///
/// The database stores timestamps as RFC3339 text; older rows written by
/// SQLite's `datetime('now')` use the space-separated form. Both are
/// accepted. Falls back to the current time if parsing fails.
pub fn parse_timestamp(datetime_str: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }

    Utc::now()
}
