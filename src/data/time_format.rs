//! Timestamp parsing for time columns and date-time tick formatting.
//!
//! All timestamps travel through the pipeline as `f64` seconds since the UNIX
//! epoch. Naive timestamps (no offset) are taken as UTC wall clock and are
//! formatted back in UTC, so an axis label shows exactly what the file says.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

/// Naive date-time layouts tried in order by [`parse_timestamp`].
pub const GENERIC_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Explicit layout used as a per-cell fallback for the secondary time column.
pub const SECONDARY_FALLBACK_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Tick format for genuine timestamp axes.
pub const AXIS_TICK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a timestamp cell using the generic layouts.
///
/// Accepts RFC 3339 (with offset), the naive layouts in [`GENERIC_FORMATS`]
/// and a bare `YYYY-MM-DD` date (midnight).
///
/// ```
/// # use phplot::data::time_format::parse_timestamp;
/// assert_eq!(parse_timestamp("1970-01-01 00:01:00"), Some(60.0));
/// assert_eq!(parse_timestamp("not a time"), None);
/// ```
pub fn parse_timestamp(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.timestamp() as f64 + dt.nanosecond() as f64 * 1e-9);
    }
    for fmt in GENERIC_FORMATS {
        if let Some(secs) = parse_with_format(cell, fmt) {
            return Some(secs);
        }
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(naive_to_secs)
}

/// Parse a cell with one explicit naive layout.
pub fn parse_with_format(cell: &str, fmt: &str) -> Option<f64> {
    NaiveDateTime::parse_from_str(cell.trim(), fmt)
        .ok()
        .map(naive_to_secs)
}

/// How the cells of a time column are turned into seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampParser {
    /// Layout tried when the generic layouts fail on a cell.
    pub fallback: Option<&'static str>,
}

impl TimestampParser {
    pub const GENERIC: Self = Self { fallback: None };

    pub const WITH_SECONDARY_FALLBACK: Self = Self {
        fallback: Some(SECONDARY_FALLBACK_FORMAT),
    };

    pub fn parse(&self, cell: &str) -> Option<f64> {
        parse_timestamp(cell).or_else(|| {
            self.fallback
                .and_then(|fmt| parse_with_format(cell, fmt))
        })
    }
}

fn naive_to_secs(ndt: NaiveDateTime) -> f64 {
    let utc = ndt.and_utc();
    utc.timestamp() as f64 + utc.nanosecond() as f64 * 1e-9
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Format seconds since the epoch with a chrono layout, in UTC.
///
/// Non-finite or out-of-range values fall back to the UNIX epoch.
pub fn format_timestamp(secs: f64, fmt: &str) -> String {
    secs_to_utc(secs).format(fmt).to_string()
}

fn secs_to_utc(secs: f64) -> DateTime<chrono::Utc> {
    if !secs.is_finite() {
        return DateTime::<chrono::Utc>::UNIX_EPOCH;
    }
    let s = secs.floor() as i64;
    let ns_frac = (((secs - s as f64) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(s, ns_frac).unwrap_or(DateTime::<chrono::Utc>::UNIX_EPOCH)
}
