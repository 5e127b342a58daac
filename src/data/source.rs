//! Reading the measurement file into a [`NormalizedDataset`].
//!
//! The file is re-read in full on every qualifying tick; there is no append
//! offset tracking. Malformed cells become nulls instead of failing the read.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::data::columns::{self, TimeColumn, TimeParse};
use crate::data::dataset::{NormalizedDataset, RawRow, TimeKind};
use crate::data::time_format::TimestampParser;

/// Why a read produced no dataset. None of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file does not exist yet.
    #[error("data file {} does not exist yet", .0.display())]
    NotFound(PathBuf),
    /// The tabular parse failed.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    /// The header has no pH-like column.
    #[error("no pH columns found in {}", .0.display())]
    NoMetricColumns(PathBuf),
    /// The read did not finish within the configured timeout.
    #[error("reading the data file timed out after {0:?}")]
    Timeout(Duration),
    /// An earlier read that timed out is still running.
    #[error("a previous read of the data file is still running")]
    InFlight,
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ReadError {
    /// Conditions shown as "waiting for data" rather than as an error.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            ReadError::NotFound(_) | ReadError::Timeout(_) | ReadError::InFlight
        )
    }

    fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReadError::NotFound(path.to_path_buf())
        } else {
            ReadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Opaque change token of the source: modification time plus byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceVersion {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Anything the refresh engine can poll.
///
/// Implementations must be shareable with a read worker thread.
pub trait DataSource: Send + Sync + 'static {
    /// Cheap change token, `ReadError::NotFound` while the source is absent.
    fn version(&self) -> Result<SourceVersion, ReadError>;

    /// Full read and schema normalization.
    fn read(&self) -> Result<NormalizedDataset, ReadError>;

    /// Human-readable name for logs and status text.
    fn describe(&self) -> String;
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvSource {
    fn version(&self) -> Result<SourceVersion, ReadError> {
        source_version(&self.path)
    }

    fn read(&self) -> Result<NormalizedDataset, ReadError> {
        read(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Change token of the file at `path`.
pub fn source_version(path: &Path) -> Result<SourceVersion, ReadError> {
    let meta = std::fs::metadata(path).map_err(|e| ReadError::from_io(path, e))?;
    Ok(SourceVersion {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

/// Read and normalize the file at `path`.
pub fn read(path: &Path) -> Result<NormalizedDataset, ReadError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| ReadError::from_io(path, e))?;
    parse_csv(bytes.as_slice(), path)
}

/// Parse CSV content. `path` is only used to label errors.
pub fn parse_csv<R: Read>(input: R, path: &Path) -> Result<NormalizedDataset, ReadError> {
    let parse_err = |message: String| ReadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| parse_err(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(parse_err("file has no header row".to_string()));
    }

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for result in rdr.records() {
        records.push(result.map_err(|e| parse_err(e.to_string()))?);
    }

    let value_columns = columns::resolve_value_columns(&headers);
    if value_columns.is_empty() {
        return Err(ReadError::NoMetricColumns(path.to_path_buf()));
    }

    let Some(mut time_column) = columns::resolve_time_column(&headers) else {
        return Err(parse_err("file has no columns".to_string()));
    };
    let (mut times, mut time_kind) = parse_time_cells(&records, &time_column);

    if times.iter().all(Option::is_none) {
        if let Some(demoted) = columns::demotion_target(&time_column, &headers) {
            log::warn!(
                "Time column '{}' contains no parseable values; using '{}' instead",
                time_column.name,
                demoted.name
            );
            time_column = demoted;
            (times, time_kind) = parse_time_cells(&records, &time_column);
        }
    }

    let sample_idx = headers
        .iter()
        .position(|h| h == columns::SAMPLE_INDEX_COLUMN);
    let value_idx: Vec<usize> = value_columns
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c))
        .collect();

    let rows = records
        .iter()
        .zip(times)
        .map(|(rec, time)| RawRow {
            time,
            sample_index: sample_idx.and_then(|i| parse_number(rec.get(i))),
            values: value_idx.iter().map(|&i| parse_number(rec.get(i))).collect(),
        })
        .collect();

    Ok(NormalizedDataset {
        time_column: time_column.name,
        time_kind,
        value_columns,
        has_sample_index: sample_idx.is_some(),
        rows,
    })
}

fn parse_time_cells(
    records: &[csv::StringRecord],
    column: &TimeColumn,
) -> (Vec<Option<f64>>, TimeKind) {
    let cells = || records.iter().map(|r| r.get(column.index));
    match column.parse {
        TimeParse::Timestamp(parser) => (
            cells().map(|c| c.and_then(|c| parser.parse(c))).collect(),
            TimeKind::Timestamp,
        ),
        TimeParse::Ordinal => (cells().map(parse_number).collect(), TimeKind::Ordinal),
        TimeParse::Auto => {
            let stamps: Vec<Option<f64>> = cells()
                .map(|c| c.and_then(|c| TimestampParser::GENERIC.parse(c)))
                .collect();
            if stamps.iter().any(Option::is_some) {
                (stamps, TimeKind::Timestamp)
            } else {
                (cells().map(parse_number).collect(), TimeKind::Ordinal)
            }
        }
    }
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
