//! Validation of raw location records into [`Point`]s.
//!
//! A record is `device_id, latitude, longitude, timestamp`. Anything that
//! does not parse cleanly is turned into a [`RejectReason`] instead of an
//! error, so the caller can log it and move on to the next record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date layouts, tried in order. Slashes are month-first, dashes with a
/// trailing year are day-first, dots are day-first. `%B` also accepts the
/// abbreviated month name.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Time-of-day suffixes appended to each date layout. `%.f` also matches an
/// absent fraction.
const TIME_LAYOUTS: &[&str] = &[" %H:%M:%S%.f", "T%H:%M:%S%.f", " %H:%M", "T%H:%M"];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%z"];

/// Zone names equivalent to UTC, accepted as a trailing word.
const UTC_DESIGNATORS: &[&str] = &["UTC", "GMT", "Z"];

/// One record as read from the input, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based position of the record in the input.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// Fields rejoined with commas in their original order.
    pub fn joined(&self) -> String {
        self.fields.join(",")
    }
}

/// A validated location sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub device_id: String,
    pub lat: f64,
    pub lon: f64,
    /// Timestamp text exactly as it appeared in the input.
    pub timestamp: String,
    /// Resolved time in seconds since the Unix epoch.
    pub time: i64,
}

/// Why a record was excluded from trip construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("latitude is not a number: {0:?}")]
    LatitudeNotANumber(String),

    #[error("longitude is not a number: {0:?}")]
    LongitudeNotANumber(String),

    #[error("latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),

    #[error("unparseable timestamp: {0:?}")]
    Timestamp(String),
}

/// Validates a raw record.
///
/// Coordinates are checked before the timestamp; the first failure wins.
pub fn parse_record(record: &RawRecord) -> Result<Point, RejectReason> {
    let [device_id, lat, lon, timestamp] = record.fields.as_slice() else {
        return Err(RejectReason::FieldCount(record.fields.len()));
    };

    let lat_value =
        parse_number(lat).ok_or_else(|| RejectReason::LatitudeNotANumber(lat.clone()))?;
    let lon_value =
        parse_number(lon).ok_or_else(|| RejectReason::LongitudeNotANumber(lon.clone()))?;

    if !(-90.0..=90.0).contains(&lat_value) {
        return Err(RejectReason::LatitudeOutOfRange(lat_value));
    }
    if !(-180.0..=180.0).contains(&lon_value) {
        return Err(RejectReason::LongitudeOutOfRange(lon_value));
    }

    let time =
        parse_timestamp(timestamp).ok_or_else(|| RejectReason::Timestamp(timestamp.clone()))?;

    Ok(Point {
        device_id: device_id.clone(),
        lat: lat_value,
        lon: lon_value,
        timestamp: timestamp.clone(),
        time,
    })
}

/// Parses a decimal number, ignoring surrounding whitespace.
///
/// `NaN` and infinities are not numbers here.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Resolves timestamp text to whole seconds since the Unix epoch.
///
/// Accepted, in order: `@<seconds>`, RFC 3339, RFC 2822, ISO-like date-times
/// with a numeric offset, then any [`DATE_LAYOUTS`] entry with an optional
/// [`TIME_LAYOUTS`] suffix and an optional trailing `UTC`/`GMT`/`Z`. Times
/// without an offset are UTC; bare dates are midnight UTC. Relative phrases
/// such as `now` or `yesterday` are rejected. Fractional seconds are
/// truncated.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(secs) = text.strip_prefix('@') {
        let secs = secs.parse::<i64>().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.timestamp());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.timestamp());
        }
    }

    parse_naive_utc(strip_utc_designator(text))
}

fn strip_utc_designator(text: &str) -> &str {
    UTC_DESIGNATORS
        .iter()
        .find_map(|zone| text.strip_suffix(zone))
        .map(str::trim_end)
        .unwrap_or(text)
}

fn parse_naive_utc(text: &str) -> Option<i64> {
    for date in DATE_LAYOUTS {
        for time in TIME_LAYOUTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, &format!("{date}{time}")) {
                return Some(dt.and_utc().timestamp());
            }
        }
    }

    DATE_LAYOUTS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
    })
}
