//! phplot crate root: re-exports and module wiring.
//!
//! A live pH dashboard: a CSV file is polled on a timer, each metric is split
//! into normal points and IQR outliers, and the result is drawn with egui.
//! Rebuilding only happens when the file or the selected metric changed, and
//! the user's zoom/pan survives every refresh.
//!
//! - `data`: CSV reading, column resolution, outlier classification
//! - `chart`: renderer-agnostic chart description
//! - `view`: zoom/pan tracking across refreshes
//! - `refresh`: the per-session incremental refresh engine
//! - `config`: dashboard configuration
//! - `app`: the native eframe window

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod refresh;
pub mod view;

mod plot;

// Public re-exports for a compact external API
pub use app::{run_dashboard, DashboardApp};
pub use chart::{build_chart, ChartDescription, Series, SeriesRole};
pub use config::{ConfigError, DashboardConfig};
pub use data::{classify, ClassifiedSeries, CsvSource, DataSource, NormalizedDataset, ReadError};
pub use refresh::{RefreshSession, RefreshStats, TickOutcome, TickOutput};
pub use view::{apply_view, AxisRange, RelayoutPayload, ViewState, ViewStateTracker};
