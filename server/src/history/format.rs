use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::{DisplayRecord, NOT_AVAILABLE};

use super::models::HistoryRecord;

const DISPLAY_FORMAT: &str = "%b %d, %Y, %I:%M %p";

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// `2024-03-05T14` and `2024-03-05 14+02:00` carry no minutes, which chrono
/// will not parse. Spells them out as `14:00`.
fn with_minutes(raw: &str) -> Option<String> {
    let date = raw.get(..10)?;
    let rest = raw.get(10..)?;
    let separator = rest.chars().next().filter(|c| *c == 'T' || *c == ' ')?;
    let hour = rest.get(1..3).filter(|h| h.bytes().all(|b| b.is_ascii_digit()))?;
    let tail = &rest[3..];
    if tail.is_empty() || tail.starts_with('+') || tail.starts_with('-') {
        Some(format!("{}{}{}:00{}", date, separator, hour, tail))
    } else {
        None
    }
}

/// Parses an ISO-8601 timestamp and keeps its wall-clock time. Offsets are
/// honoured but not converted, so `14:30Z` displays as 02:30 PM.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(stem) => format!("{}+00:00", stem),
        None => raw.to_string(),
    };
    let normalized = with_minutes(&normalized).unwrap_or(normalized);

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.naive_local())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(timestamp: Option<&str>) -> String {
    match timestamp {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(raw) => match parse_timestamp(raw) {
            Some(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
            None => raw.to_string(),
        },
    }
}

pub fn format_dimensions(width: Option<&str>, height: Option<&str>) -> String {
    format!(
        "{} x {}",
        width.unwrap_or(NOT_AVAILABLE),
        height.unwrap_or(NOT_AVAILABLE)
    )
}

pub fn format_result(positive: bool) -> &'static str {
    if positive { "Positive" } else { "Negative" }
}

pub fn format_record(record: &HistoryRecord) -> DisplayRecord {
    DisplayRecord {
        id: record
            .id
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        timestamp: format_timestamp(record.timestamp.as_deref()),
        image_size: format_dimensions(record.img_width.as_deref(), record.img_height.as_deref()),
        result: format_result(record.result.0).to_string(),
    }
}
