use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use std::fmt::{Display, Write};

use crate::error::ReportError;
use crate::ports::Result;

pub const CHANNEL_URL_BASE: &str = "https://www.youtube.com/@";

/// Parses an ISO 8601 timestamp as returned by the API
/// Tries strict RFC 3339, then ISO 8601 without offset (assumed UTC), then a
/// lenient parser for other shapes that carry their own zone
pub fn parse_published_at(timestamp_str: &str) -> Result<DateTime<FixedOffset>> {
    // e.g. "2013-04-18T17:45:10Z" or "2013-04-18T17:45:10+02:00"
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp_str) {
        return Ok(dt);
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(timestamp_str, pattern) {
            return Ok(naive_dt.and_utc().fixed_offset());
        }
    }

    dateparser::parse(timestamp_str)
        .map(|dt| dt.fixed_offset())
        .map_err(|e| ReportError::InvalidTimestamp {
            value: timestamp_str.to_string(),
            reason: e.to_string(),
        })
}

/// Renders a timestamp with a strftime pattern, rejecting unknown specifiers
/// instead of panicking like `to_string()` would
pub fn format_with<T>(dt: &DateTime<T>, pattern: &str) -> Result<String>
where
    T: TimeZone,
    T::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", dt.format(pattern))
        .map_err(|_| ReportError::InvalidDateFormat(pattern.to_string()))?;
    Ok(out)
}

/// Converts a timestamp to the given timezone and renders it
pub fn format_in_timezone<T: TimeZone>(
    dt: &DateTime<FixedOffset>,
    timezone: &T,
    pattern: &str,
) -> Result<String>
where
    T::Offset: Display,
{
    format_with(&dt.with_timezone(timezone), pattern)
}

/// Drops the single leading marker character of a `customUrl` ("@name" -> "name")
pub fn handle_from_custom_url(custom_url: &str) -> String {
    let mut chars = custom_url.chars();
    chars.next();
    chars.as_str().to_string()
}

pub fn channel_url(handle: &str) -> String {
    format!("{}{}", CHANNEL_URL_BASE, handle)
}

/// Sanitizes a string for use in a filename
/// Replaces invalid filename characters with hyphens
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
