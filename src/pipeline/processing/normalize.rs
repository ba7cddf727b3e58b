use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::pipeline::processing::schema::Record;

/// A record with its timestamp coerced to a calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub record: Record,
    /// `None` when the timestamp was empty or did not parse
    pub date: Option<NaiveDate>,
}

impl NormalizedRecord {
    pub fn category(&self) -> Option<&str> {
        self.record.category.as_deref()
    }
}

/// Result of a normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationOutcome {
    /// Sorted ascending by date, undated records last
    pub records: Vec<NormalizedRecord>,
    /// Number of records whose timestamp did not yield a date
    pub unparseable: usize,
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static UTC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\b(?:UTC|GMT)$").expect("valid timezone suffix pattern"));

/// Offset-carrying layouts not covered by RFC 3339 / RFC 2822
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    // Google Forms response sheets; two-digit years first since %Y also takes "24"
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Dates before this year are treated as misreads, not data
const MIN_YEAR: i32 = 1000;

/// Best-effort coercion of timestamp text into a calendar date.
///
/// Returns `None` for anything it cannot read; never errors. Values with an
/// explicit offset keep the wall-clock date of that offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    coerce(raw).filter(|date| date.year() >= MIN_YEAR)
}

fn coerce(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }

    let collapsed = WHITESPACE.replace_all(trimmed, " ");
    let cleaned = UTC_SUFFIX.replace(&collapsed, "");
    let value = cleaned.as_ref();

    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    None
}

/// Derive a date for every record, then sort ascending by date.
///
/// Records whose timestamp does not parse are kept with `date: None` and
/// placed after all dated records. The sort is stable.
pub fn normalize(records: Vec<Record>) -> NormalizationOutcome {
    let mut normalized: Vec<NormalizedRecord> = records
        .into_iter()
        .map(|record| {
            let date = record.timestamp.as_deref().and_then(parse_timestamp);
            NormalizedRecord { record, date }
        })
        .collect();

    let unparseable = normalized.iter().filter(|r| r.date.is_none()).count();
    if unparseable > 0 {
        debug!(unparseable, "Timestamps could not be parsed; rows excluded from daily volume");
    }

    normalized.sort_by_key(|r| (r.date.is_none(), r.date));

    NormalizationOutcome {
        records: normalized,
        unparseable,
    }
}
