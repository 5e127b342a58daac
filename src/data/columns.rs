//! Column resolution rules.
//!
//! The measurement files come from several logger versions that disagree on
//! column names. Instead of guessing in nested conditionals, the policy is a
//! pair of ordered rule lists. Each rule inspects the header and either
//! matches or passes; the first match wins.

use crate::data::time_format::TimestampParser;

pub const PRIMARY_TIME_COLUMN: &str = "pc_time";
pub const SECONDARY_TIME_COLUMN: &str = "ph_time";
pub const SAMPLE_INDEX_COLUMN: &str = "samp_num";

/// The conventionally named pH columns, in the order they are listed.
pub const KNOWN_METRIC_COLUMNS: [&str; 2] = ["pH_free", "ph_total"];

/// Preference order when no metric has been selected yet.
pub const PREFERRED_METRICS: [&str; 2] = ["ph_total", "pH_free"];

// ─────────────────────────────────────────────────────────────────────────────
// Time column
// ─────────────────────────────────────────────────────────────────────────────

/// How the cells of the chosen time column are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeParse {
    /// Cells are timestamps.
    Timestamp(TimestampParser),
    /// Cells are plain numbers.
    Ordinal,
    /// Timestamps if any cell parses as one, numbers otherwise.
    Auto,
}

/// Outcome of a time rule that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeColumn {
    pub name: String,
    pub index: usize,
    pub parse: TimeParse,
    pub rule: TimeRule,
}

/// Time-column rules, evaluated in the order of [`TIME_RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRule {
    /// `pc_time`, parsed with the generic timestamp layouts.
    PrimaryTimestamp,
    /// `ph_time`, generic layouts then `%m/%d/%Y %H:%M:%S`.
    SecondaryTimestamp,
    /// `samp_num`, an explicit counter.
    SampleIndex,
    /// Whatever the first column is. Last resort only: the column may be
    /// neither temporal nor numeric, in which case every time value is null.
    FirstColumn,
}

pub const TIME_RULES: [TimeRule; 4] = [
    TimeRule::PrimaryTimestamp,
    TimeRule::SecondaryTimestamp,
    TimeRule::SampleIndex,
    TimeRule::FirstColumn,
];

impl TimeRule {
    /// Match this rule against a header row, or pass with `None`.
    pub fn evaluate(self, headers: &[String]) -> Option<TimeColumn> {
        let (index, parse) = match self {
            TimeRule::PrimaryTimestamp => (
                find(headers, PRIMARY_TIME_COLUMN)?,
                TimeParse::Timestamp(TimestampParser::GENERIC),
            ),
            TimeRule::SecondaryTimestamp => (
                find(headers, SECONDARY_TIME_COLUMN)?,
                TimeParse::Timestamp(TimestampParser::WITH_SECONDARY_FALLBACK),
            ),
            TimeRule::SampleIndex => (find(headers, SAMPLE_INDEX_COLUMN)?, TimeParse::Ordinal),
            TimeRule::FirstColumn => {
                if headers.is_empty() {
                    return None;
                }
                (0, TimeParse::Auto)
            }
        };
        Some(TimeColumn {
            name: headers[index].clone(),
            index,
            parse,
            rule: self,
        })
    }
}

/// Run [`TIME_RULES`] in order. `None` only for an empty header.
pub fn resolve_time_column(headers: &[String]) -> Option<TimeColumn> {
    TIME_RULES.iter().find_map(|rule| rule.evaluate(headers))
}

/// Column to switch to when the chosen time column is entirely unparseable.
///
/// Applies only to names that claim to be time; the sample index is preferred,
/// the first column is the fallback. Returns `None` when no demotion applies.
pub fn demotion_target(chosen: &TimeColumn, headers: &[String]) -> Option<TimeColumn> {
    if !looks_temporal(&chosen.name) {
        return None;
    }
    let index = find(headers, SAMPLE_INDEX_COLUMN).unwrap_or(0);
    if index == chosen.index {
        return None;
    }
    let name = headers.get(index)?.clone();
    let rule = if name == SAMPLE_INDEX_COLUMN {
        TimeRule::SampleIndex
    } else {
        TimeRule::FirstColumn
    };
    Some(TimeColumn {
        name,
        index,
        parse: TimeParse::Ordinal,
        rule,
    })
}

/// Whether a column name suggests a temporal quantity.
pub fn looks_temporal(name: &str) -> bool {
    name.to_lowercase().contains("time")
}

// ─────────────────────────────────────────────────────────────────────────────
// Value columns
// ─────────────────────────────────────────────────────────────────────────────

/// Metric-column rules, evaluated in the order of [`VALUE_RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Any of [`KNOWN_METRIC_COLUMNS`], exact names.
    KnownPair,
    /// Any column containing a case-insensitive `ph` that is not a time column.
    PhToken,
}

pub const VALUE_RULES: [ValueRule; 2] = [ValueRule::KnownPair, ValueRule::PhToken];

impl ValueRule {
    /// Matching column names in header order, or `None` to pass.
    pub fn evaluate(self, headers: &[String]) -> Option<Vec<String>> {
        let found: Vec<String> = match self {
            ValueRule::KnownPair => KNOWN_METRIC_COLUMNS
                .iter()
                .filter(|name| find(headers, name).is_some())
                .map(|name| name.to_string())
                .collect(),
            ValueRule::PhToken => headers
                .iter()
                .filter(|h| h.to_lowercase().contains("ph") && !looks_temporal(h))
                .cloned()
                .collect(),
        };
        if found.is_empty() {
            None
        } else {
            Some(found)
        }
    }
}

/// Run [`VALUE_RULES`] in order; an empty result means no metric columns.
pub fn resolve_value_columns(headers: &[String]) -> Vec<String> {
    let mut columns = VALUE_RULES
        .iter()
        .find_map(|rule| rule.evaluate(headers))
        .unwrap_or_default();
    let mut seen = std::collections::HashSet::new();
    columns.retain(|c| seen.insert(c.clone()));
    columns
}

/// The metric shown when nothing has been selected yet.
pub fn default_metric(value_columns: &[String]) -> Option<&str> {
    PREFERRED_METRICS
        .iter()
        .find_map(|p| value_columns.iter().find(|c| c == p))
        .or_else(|| value_columns.first())
        .map(String::as_str)
}

fn find(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
