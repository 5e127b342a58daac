//! Outlier classification with an interquartile-range fence.

use serde::{Deserialize, Serialize};

use crate::data::dataset::NormalizedDataset;

/// Multiple of the IQR added beyond each quartile.
pub const FENCE_FACTOR: f64 = 1.5;

/// Below this many inliers the fence is considered degenerate and ignored.
pub const MIN_INLIERS: usize = 5;

/// A single plotted point. `x` is null when the row's time cell did not parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: Option<f64>,
    pub y: f64,
}

impl SeriesPoint {
    pub fn new(x: Option<f64>, y: f64) -> Self {
        Self { x, y }
    }
}

/// The quartile fence computed for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFence {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFence {
    /// Fence over `values`, `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - FENCE_FACTOR * iqr,
            upper: q3 + FENCE_FACTOR * iqr,
        })
    }

    /// Bounds are inclusive.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

/// Rows of one metric split for plotting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassifiedSeries {
    pub normal: Vec<SeriesPoint>,
    pub outliers: Vec<SeriesPoint>,
    /// Sample counter for every row, plotted on the secondary axis.
    pub auxiliary: Vec<SeriesPoint>,
    /// The fence used, `None` when there were no values to fence.
    pub fence: Option<IqrFence>,
}

/// Quantile of already sorted data, linear interpolation between order
/// statistics at position `(n - 1) * q`.
///
/// ```
/// # use phplot::data::classify::quantile;
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), Some(1.75));
/// assert_eq!(quantile(&[], 0.5), None);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = last as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Split `metric` into normal and outlier points and derive the counter series.
///
/// Returns `None` when `metric` is not a value column of `dataset`. Rows with
/// a null metric value are in neither set; the counter covers every row.
pub fn classify(dataset: &NormalizedDataset, metric: &str) -> Option<ClassifiedSeries> {
    let points: Vec<SeriesPoint> = dataset
        .metric_values(metric)?
        .filter_map(|(x, v)| v.map(|y| SeriesPoint::new(x, y)))
        .collect();

    let values: Vec<f64> = points.iter().map(|p| p.y).collect();
    let fence = IqrFence::from_values(&values);

    let (mut normal, mut outliers) = match fence {
        Some(f) => points.iter().partition::<Vec<_>, _>(|p| f.contains(p.y)),
        None => (Vec::new(), Vec::new()),
    };
    if normal.len() < MIN_INLIERS {
        normal = points.iter().collect();
        outliers.clear();
    }

    let auxiliary = dataset
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let counter = if dataset.has_sample_index {
                r.sample_index.unwrap_or(i as f64)
            } else {
                i as f64
            };
            SeriesPoint::new(r.time, counter)
        })
        .collect();

    Some(ClassifiedSeries {
        normal: normal.into_iter().copied().collect(),
        outliers: outliers.into_iter().copied().collect(),
        auxiliary,
        fence,
    })
}
