//! Record filter: numeric identifier and parseable timestamps.

use super::{RawRecord, RawValue, Rejection};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time layouts tried, in order, after RFC 3339.
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Bare-date layouts; these parse as midnight.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// How text timestamps are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub datetime_formats: Vec<String>,
    pub date_formats: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            datetime_formats: DEFAULT_DATETIME_FORMATS.iter().map(|f| f.to_string()).collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// A row whose identifier and timestamps all checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredRecord {
    pub alarm_at: NaiveDateTime,
    pub cleared_at: NaiveDateTime,
}

/// True when the identifier cell holds something numeric (and not NaN).
pub fn has_numeric_identifier(value: Option<&RawValue>) -> bool {
    match value {
        Some(RawValue::Number(n)) => !n.is_nan(),
        Some(RawValue::Text(s)) => s.trim().parse::<f64>().is_ok_and(|n| !n.is_nan()),
        Some(RawValue::DateTime(_)) | None => false,
    }
}

/// Parse a timestamp cell. Offsets are dropped, never converted.
pub fn parse_timestamp(value: Option<&RawValue>, options: &ParseOptions) -> Option<NaiveDateTime> {
    let text = match value? {
        RawValue::DateTime(dt) => return Some(*dt),
        RawValue::Number(_) => return None,
        RawValue::Text(s) => s.trim(),
    };
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    options
        .datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            options
                .date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Apply the filter to one row.
pub fn check(record: &RawRecord, options: &ParseOptions) -> Result<FilteredRecord, Rejection> {
    if !has_numeric_identifier(record.identifier.as_ref()) {
        return Err(Rejection::InvalidIdentifier);
    }

    let alarm_at = parse_timestamp(record.alarm_at.as_ref(), options);
    let cleared_at = parse_timestamp(record.cleared_at.as_ref(), options);

    match (alarm_at, cleared_at) {
        (Some(alarm_at), Some(cleared_at)) => Ok(FilteredRecord { alarm_at, cleared_at }),
        _ => Err(Rejection::InvalidTimestamp),
    }
}
