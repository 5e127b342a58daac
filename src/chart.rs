//! Renderer-agnostic chart description.
//!
//! A [`ChartDescription`] is the only thing the refresh engine hands to the
//! renderer: named series plus axis configuration. It is plain data and can
//! be serialized to JSON, so any front end (the egui window in [`crate::app`]
//! or the headless `--once` mode) can draw it.

use serde::{Deserialize, Serialize};

use crate::data::classify::{ClassifiedSeries, SeriesPoint};
use crate::data::dataset::{NormalizedDataset, TimeKind};
use crate::data::time_format::AXIS_TICK_FORMAT;

pub const AUXILIARY_SERIES_NAME: &str = "Sample Number";
pub const OUTLIER_SERIES_NAME: &str = "Outliers";

/// Transition duration hint for renderers that animate updates.
pub const TRANSITION_MS: u32 = 300;

// ─────────────────────────────────────────────────────────────────────────────
// Style types
// ─────────────────────────────────────────────────────────────────────────────

/// What a series represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesRole {
    Normal,
    Outliers,
    Auxiliary,
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    Lines,
    Markers,
    LinesAndMarkers,
}

impl DrawMode {
    pub fn has_lines(self) -> bool {
        matches!(self, DrawMode::Lines | DrawMode::LinesAndMarkers)
    }

    pub fn has_markers(self) -> bool {
        matches!(self, DrawMode::Markers | DrawMode::LinesAndMarkers)
    }
}

/// Which y axis a series is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YAxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerSymbol {
    Circle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDash {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size: f32,
    pub symbol: MarkerSymbol,
    /// `None` lets the renderer pick from its palette.
    pub color_rgba: Option<[u8; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub width: f32,
    pub dash: LineDash,
    pub color_rgba: Option<[u8; 4]>,
}

const RED: [u8; 4] = [214, 39, 40, 255];
const GRAY: [u8; 4] = [127, 127, 127, 255];

// ─────────────────────────────────────────────────────────────────────────────
// Series and axes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub role: SeriesRole,
    pub mode: DrawMode,
    pub y_axis: YAxisSide,
    pub points: Vec<SeriesPoint>,
    pub marker: Option<MarkerStyle>,
    pub line: Option<LineStyle>,
}

/// Value scale of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
    Date,
}

/// How tick labels are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisFormat {
    /// Values are seconds since the epoch, labelled with a chrono layout.
    DateTime { tick_format: String, tick_angle: i32 },
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Option<String>,
    pub format: AxisFormat,
    pub scale: AxisScale,
    /// Explicit framing `[low, high]`; `None` means the renderer decides.
    pub range: Option<[f64; 2]>,
    /// Renderer should fit the axis to the data.
    pub autorange: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            title: None,
            format: AxisFormat::Numeric,
            scale: AxisScale::Linear,
            range: None,
            autorange: true,
        }
    }
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Horizontal legend above the plot, right aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendPlacement {
    TopRightHorizontal,
}

// ─────────────────────────────────────────────────────────────────────────────
// ChartDescription
// ─────────────────────────────────────────────────────────────────────────────

/// The declarative figure handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub title: String,
    pub series: Vec<Series>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Present when some series targets [`YAxisSide::Secondary`].
    pub y2_axis: Option<Axis>,
    pub legend: LegendPlacement,
    pub transition_ms: u32,
}

impl ChartDescription {
    /// A chart without series that only carries a message as its title.
    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            series: Vec::new(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            y2_axis: None,
            legend: LegendPlacement::TopRightHorizontal,
            transition_ms: 0,
        }
    }

    /// Placeholder for an unknown metric selection, with generic axis titles.
    pub fn column_not_found(metric: &str) -> Self {
        Self {
            x_axis: Axis::titled("Time"),
            y_axis: Axis::titled("pH"),
            ..Self::placeholder(format!("Error: Selected column '{metric}' not found"))
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series_by_role(&self, role: SeriesRole) -> Option<&Series> {
        self.series.iter().find(|s| s.role == role)
    }
}

/// Build the three-series chart for `metric`.
///
/// The outlier series is always present, possibly empty, so renderers and
/// callers can rely on a fixed layout.
pub fn build_chart(
    dataset: &NormalizedDataset,
    metric: &str,
    classified: &ClassifiedSeries,
) -> ChartDescription {
    let normal = Series {
        name: metric.to_string(),
        role: SeriesRole::Normal,
        mode: DrawMode::LinesAndMarkers,
        y_axis: YAxisSide::Primary,
        points: classified.normal.clone(),
        marker: Some(MarkerStyle {
            size: 8.0,
            symbol: MarkerSymbol::Circle,
            color_rgba: None,
        }),
        line: Some(LineStyle {
            width: 2.0,
            dash: LineDash::Solid,
            color_rgba: None,
        }),
    };
    let outliers = Series {
        name: OUTLIER_SERIES_NAME.to_string(),
        role: SeriesRole::Outliers,
        mode: DrawMode::Markers,
        y_axis: YAxisSide::Primary,
        points: classified.outliers.clone(),
        marker: Some(MarkerStyle {
            size: 10.0,
            symbol: MarkerSymbol::Cross,
            color_rgba: Some(RED),
        }),
        line: None,
    };
    let auxiliary = Series {
        name: AUXILIARY_SERIES_NAME.to_string(),
        role: SeriesRole::Auxiliary,
        mode: DrawMode::Lines,
        y_axis: YAxisSide::Secondary,
        points: classified.auxiliary.clone(),
        marker: None,
        line: Some(LineStyle {
            width: 1.0,
            dash: LineDash::Dotted,
            color_rgba: Some(GRAY),
        }),
    };

    let x_axis = match dataset.time_kind {
        TimeKind::Timestamp => Axis {
            title: Some(dataset.time_column.clone()),
            format: AxisFormat::DateTime {
                tick_format: AXIS_TICK_FORMAT.to_string(),
                tick_angle: 45,
            },
            scale: AxisScale::Date,
            ..Default::default()
        },
        TimeKind::Ordinal => Axis::titled(dataset.time_column.clone()),
    };

    ChartDescription {
        title: format!("{} vs {}", metric, dataset.time_column),
        series: vec![normal, outliers, auxiliary],
        x_axis,
        y_axis: Axis::titled(metric),
        y2_axis: Some(Axis::titled(AUXILIARY_SERIES_NAME)),
        legend: LegendPlacement::TopRightHorizontal,
        transition_ms: TRANSITION_MS,
    }
}
