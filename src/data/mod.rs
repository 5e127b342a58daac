//! Data side of the dashboard: reading, schema resolution and classification.
//!
//! Nothing in here knows about plotting or view state.

pub mod classify;
pub mod columns;
pub mod dataset;
pub mod source;
pub mod time_format;

pub use classify::{classify, ClassifiedSeries, IqrFence, SeriesPoint};
pub use dataset::{NormalizedDataset, RawRow, TimeKind};
pub use source::{CsvSource, DataSource, ReadError, SourceVersion};
