//! Entry date resolution across feed dialects.
//!
//! Feeds disagree on where the publish timestamp lives (`pubDate`,
//! `published`, `updated`, Dublin Core `dc:date`, ...) and on how it is
//! formatted. The resolver walks a fixed priority list of field names and a
//! chain of accepted formats; a field that is present but unparsable is
//! logged and skipped rather than failing the entry.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::RawEntry;

/// Field names tried in order when resolving an entry's timestamp.
const DATE_FIELD_PRIORITY: &[&str] = &[
    "published",
    "pubDate",
    "updated",
    "dc:date",
    "created",
    "date",
    "modified",
];

/// Naive formats accepted after RFC 2822 and RFC 3339 both fail.
/// Values without an offset are assumed UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Resolve a comparable timestamp for `entry`, or `None` if no date-like
/// field yields one. Entries without a resolvable date cannot be ordered or
/// compared to a watermark and must be skipped by the caller.
#[must_use]
pub fn resolve_entry_date(entry: &RawEntry) -> Option<DateTime<Utc>> {
    for field in DATE_FIELD_PRIORITY {
        let Some(raw) = entry.date_field(field) else {
            continue;
        };
        match parse_date_flexible(raw) {
            Some(dt) => return Some(dt),
            None => {
                tracing::warn!(field, value = raw, "unparsable date field — trying next");
            }
        }
    }
    None
}

/// Parse a date string in any of the formats feeds commonly use:
/// RFC 2822 (`Tue, 02 Jan 2024 09:30:00 GMT`), RFC 3339 / ISO 8601, and a
/// few loose naive forms including bare dates.
#[must_use]
pub fn parse_date_flexible(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
