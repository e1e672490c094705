//! Prism - Column type classifier
//!
//! Labels each preview column `numeric`, `datetime` or `categorical` from a
//! sample of its non-empty values. Columns are classified independently and
//! the result only depends on the sample order.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::preview::PreviewTable;

/// Maximum number of non-empty values sampled per column
pub const SAMPLE_LIMIT: usize = 50;

/// Coarse type label inferred for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Datetime,
    Categorical,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Datetime => "datetime",
            ColumnType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One label per header position.
pub fn classify_columns(table: &PreviewTable) -> Vec<ColumnType> {
    (0..table.width())
        .map(|col| classify_samples(table.column(col)))
        .collect()
}

/// Classify a column from its values. Blank values are skipped and at most
/// [`SAMPLE_LIMIT`] of the rest are inspected.
pub fn classify_samples<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let samples: Vec<&str> = values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .take(SAMPLE_LIMIT)
        .collect();

    if samples.is_empty() {
        return ColumnType::Categorical;
    }
    if samples.iter().all(|v| parse_numeric(v).is_some()) {
        return ColumnType::Numeric;
    }
    if samples.iter().all(|v| is_datetime(v)) {
        return ColumnType::Datetime;
    }
    ColumnType::Categorical
}

// ─── Numeric literals ───────────────────────────────────────────────────────

/// Parse a numeric literal: decimal/exponent floats, `0x`/`0o`/`0b` integers
/// and signed `Infinity`. `NaN` and Rust's `inf` spellings are rejected.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let t = value.trim();
    if t.is_empty() {
        return None;
    }

    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(v) = parse_prefixed_integer(t) {
        return Some(v);
    }

    if t.chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }

    t.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_prefixed_integer(t: &str) -> Option<f64> {
    let (radix, digits) = match t.get(..2)? {
        "0x" | "0X" => (16, &t[2..]),
        "0o" | "0O" => (8, &t[2..]),
        "0b" | "0B" => (2, &t[2..]),
        _ => return None,
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|v| v as f64)
}

// ─── Date / time literals ───────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Minute precision with an explicit offset, e.g. 2024-01-15T10:30+02:00
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Whether the value is a valid calendar date or date-time.
pub fn is_datetime(value: &str) -> bool {
    let t = value.trim();
    if t.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(t).is_ok() || DateTime::parse_from_rfc2822(t).is_ok() {
        return true;
    }
    if OFFSET_DATETIME_FORMATS
        .iter()
        .any(|f| DateTime::parse_from_str(t, f).is_ok())
    {
        return true;
    }
    // A trailing Z is UTC; the rest must be a local date-time
    let local = t.strip_suffix(['Z', 'z']).unwrap_or(t);
    if DATETIME_FORMATS
        .iter()
        .any(|f| NaiveDateTime::parse_from_str(local, f).is_ok())
    {
        return true;
    }
    if DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(t, f).is_ok())
    {
        return true;
    }

    // Year only, e.g. 2024
    if t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    // Year-month, e.g. 2024-03
    t.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", t), "%Y-%m-%d").is_ok()
}
