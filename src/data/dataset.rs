//! Normalized, plotting-agnostic view of one read of the measurement file.

use serde::{Deserialize, Serialize};

/// Whether the resolved time column holds real timestamps or a plain counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeKind {
    /// Seconds since the UNIX epoch (UTC wall clock).
    Timestamp,
    /// Sample index or any other plain number.
    Ordinal,
}

/// One observation of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Value of the resolved time column, `None` when the cell did not parse.
    pub time: Option<f64>,
    /// Value of the `samp_num` column if the file has one.
    pub sample_index: Option<f64>,
    /// Metric cells, aligned with [`NormalizedDataset::value_columns`].
    pub values: Vec<Option<f64>>,
}

/// The full current content of the source, with its schema resolved.
///
/// A dataset is produced fresh by every successful read and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDataset {
    pub time_column: String,
    pub time_kind: TimeKind,
    /// Metric columns in resolution order. Never empty.
    pub value_columns: Vec<String>,
    pub has_sample_index: bool,
    pub rows: Vec<RawRow>,
}

impl NormalizedDataset {
    /// Position of `metric` in [`value_columns`](Self::value_columns).
    pub fn metric_index(&self, metric: &str) -> Option<usize> {
        self.value_columns.iter().position(|c| c == metric)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(time, value)` for one metric over every row, nulls included.
    pub fn metric_values<'a>(
        &'a self,
        metric: &str,
    ) -> Option<impl Iterator<Item = (Option<f64>, Option<f64>)> + 'a> {
        let idx = self.metric_index(metric)?;
        Some(
            self.rows
                .iter()
                .map(move |r| (r.time, r.values.get(idx).copied().flatten())),
        )
    }

    /// Number of rows with a non-null value for `metric` (0 if unknown).
    pub fn non_null_count(&self, metric: &str) -> usize {
        self.metric_values(metric)
            .map(|it| it.filter(|(_, v)| v.is_some()).count())
            .unwrap_or(0)
    }
}
