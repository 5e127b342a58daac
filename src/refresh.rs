//! The incremental refresh engine.
//!
//! A [`RefreshSession`] is created per dashboard session and driven by ticks.
//! Each tick compares the source's change token and the selected metric
//! against the last successful render. If both match, the cached chart is
//! reused with only its framing patched from the current view state. If not,
//! the source is read, classified and a fresh chart is built. Failures never
//! touch the cache, so recovery always rebuilds from scratch.
//!
//! With a read timeout configured, the version check and the read run together
//! on one worker thread, and a session never has more than one worker alive.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;

use crate::chart::{build_chart, ChartDescription};
use crate::data::classify::classify;
use crate::data::columns::default_metric;
use crate::data::dataset::NormalizedDataset;
use crate::data::source::{CsvSource, DataSource, ReadError, SourceVersion};
use crate::view::{RelayoutPayload, ViewState, ViewStateTracker};

pub const WAITING_TITLE: &str = "Waiting for data file...";
pub const READ_ERROR_TITLE: &str = "Error reading data file";
pub const WAITING_FOR_FILE_STATUS: &str = "Waiting for file to be created...";

/// Identity of a rendered chart: reusable iff both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    pub source_version: SourceVersion,
    pub selected_metric: Option<String>,
}

/// Which branch a tick took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickOutcome {
    /// Source absent or read timed out.
    Waiting,
    /// Cached chart reused, nothing read.
    Reused,
    /// Source read and chart rebuilt.
    Rebuilt,
    /// Read failed or produced no usable metric columns.
    ReadFailed,
    /// The selected metric is not a value column of the current data.
    UnknownMetric,
}

/// Everything a tick hands to the front end.
#[derive(Debug, Clone, Serialize)]
pub struct TickOutput {
    pub chart: ChartDescription,
    pub status: String,
    /// Value columns of the last successful read (dropdown options).
    pub metrics: Vec<String>,
    /// Metric actually plotted, once known.
    pub selected_metric: Option<String>,
    pub outcome: TickOutcome,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub ticks: u64,
    /// Successful full reads of the source.
    pub reads: u64,
    pub classifications: u64,
    pub cache_hits: u64,
    pub rebuilds: u64,
    pub failures: u64,
}

/// Result of checking the source, reading it only when the version moved.
enum Fetch {
    /// Version equals the reusable cache entry; nothing was read.
    Unchanged(SourceVersion),
    Fresh(SourceVersion, NormalizedDataset),
}

type FetchResult = Result<Fetch, ReadError>;

fn fetch<S: DataSource>(source: &S, reusable: Option<SourceVersion>) -> FetchResult {
    let version = source.version()?;
    if reusable == Some(version) {
        return Ok(Fetch::Unchanged(version));
    }
    Ok(Fetch::Fresh(version, source.read()?))
}

struct CachedChart {
    fingerprint: Fingerprint,
    chart: ChartDescription,
    metrics: Vec<String>,
    metric: String,
}

/// Per-session refresh state: the cached chart and the view tracker.
pub struct RefreshSession<S: DataSource> {
    source: Arc<S>,
    read_timeout: Option<Duration>,
    tracker: ViewStateTracker,
    cache: Option<CachedChart>,
    /// Metric list from the last successful read, kept across failures.
    known_metrics: Vec<String>,
    force_rebuild: bool,
    /// Worker of an earlier tick that outlived its timeout. At most one.
    pending: Option<Receiver<FetchResult>>,
    stats: RefreshStats,
}

impl RefreshSession<CsvSource> {
    /// Session polling a CSV file.
    pub fn for_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(CsvSource::new(path))
    }
}

impl<S: DataSource> RefreshSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            read_timeout: None,
            tracker: ViewStateTracker::new(),
            cache: None,
            known_metrics: Vec::new(),
            force_rebuild: false,
            pending: None,
            stats: RefreshStats::default(),
        }
    }

    /// Run version checks and reads on a worker thread and give up after
    /// `timeout`. While such a worker is still running, later ticks report
    /// waiting instead of starting another one.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats
    }

    pub fn view_state(&self) -> &ViewState {
        self.tracker.state()
    }

    /// Feed a renderer interaction into the view tracker.
    pub fn capture(&mut self, payload: &RelayoutPayload) -> ViewState {
        self.tracker.capture(payload)
    }

    /// Fingerprint of the last successful render, if any.
    pub fn cached_fingerprint(&self) -> Option<&Fingerprint> {
        self.cache.as_ref().map(|c| &c.fingerprint)
    }

    /// Force the next tick down the rebuild path.
    pub fn invalidate(&mut self) {
        self.force_rebuild = true;
    }

    /// The user picked a metric: rebuild right away regardless of the cache.
    pub fn select_metric(&mut self, metric: &str) -> TickOutput {
        log::info!("Metric selection changed to '{metric}'");
        self.invalidate();
        self.tick(Some(metric))
    }

    /// One refresh cycle.
    pub fn tick(&mut self, selected: Option<&str>) -> TickOutput {
        self.stats.ticks += 1;
        let force = std::mem::take(&mut self.force_rebuild);

        let reusable = match &self.cache {
            Some(c) if !force && c.fingerprint.selected_metric.as_deref() == selected => {
                Some(c.fingerprint.source_version)
            }
            _ => None,
        };

        let (version, dataset) = match self.fetch_source(reusable) {
            Ok(Fetch::Fresh(v, d)) => (v, d),
            Ok(Fetch::Unchanged(v)) => {
                let fingerprint = Fingerprint {
                    source_version: v,
                    selected_metric: selected.map(str::to_string),
                };
                if let Some(out) = self.try_reuse(&fingerprint) {
                    return out;
                }
                // only reachable if the cache changed under the fetch
                self.invalidate();
                return self.read_failed(ReadError::InFlight);
            }
            Err(e) => return self.read_failed(e),
        };
        let fingerprint = Fingerprint {
            source_version: version,
            selected_metric: selected.map(str::to_string),
        };
        self.known_metrics = dataset.value_columns.clone();
        self.rebuild(fingerprint, &dataset, selected)
    }

    fn try_reuse(&mut self, fingerprint: &Fingerprint) -> Option<TickOutput> {
        let cached = self.cache.as_ref().filter(|c| c.fingerprint == *fingerprint)?;
        let chart = self.tracker.reapply(cached.chart.clone());
        let out = TickOutput {
            chart,
            status: format!("{} (no changes)", updated_at()),
            metrics: cached.metrics.clone(),
            selected_metric: Some(cached.metric.clone()),
            outcome: TickOutcome::Reused,
        };
        self.stats.cache_hits += 1;
        log::debug!("No changes in {}, reusing cached chart", self.source.describe());
        Some(out)
    }

    fn rebuild(
        &mut self,
        fingerprint: Fingerprint,
        dataset: &NormalizedDataset,
        selected: Option<&str>,
    ) -> TickOutput {
        let metric = match selected.or_else(|| default_metric(&dataset.value_columns)) {
            Some(m) => m.to_string(),
            None => {
                return self.read_failed(ReadError::NoMetricColumns(self.source.describe().into()))
            }
        };

        let Some(classified) = classify(dataset, &metric) else {
            log::warn!("Selected column '{metric}' not found in {}", self.source.describe());
            self.stats.failures += 1;
            return TickOutput {
                chart: self.tracker.reapply(ChartDescription::column_not_found(&metric)),
                status: format!("Column '{metric}' not found"),
                metrics: dataset.value_columns.clone(),
                selected_metric: Some(metric),
                outcome: TickOutcome::UnknownMetric,
            };
        };
        self.stats.classifications += 1;

        let chart = self
            .tracker
            .reapply(build_chart(dataset, &metric, &classified));
        log::info!(
            "Rebuilt chart for '{}': {} rows, {} outliers",
            metric,
            dataset.len(),
            classified.outliers.len()
        );

        self.stats.rebuilds += 1;
        self.cache = Some(CachedChart {
            fingerprint,
            chart: chart.clone(),
            metrics: dataset.value_columns.clone(),
            metric: metric.clone(),
        });
        TickOutput {
            chart,
            status: updated_at(),
            metrics: dataset.value_columns.clone(),
            selected_metric: Some(metric),
            outcome: TickOutcome::Rebuilt,
        }
    }

    fn read_failed(&mut self, err: ReadError) -> TickOutput {
        if err.is_waiting() {
            // the first successful read afterwards must be treated as fresh
            self.cache = None;
            let status = match &err {
                ReadError::NotFound(_) => {
                    log::info!("{err}. Waiting for it to be created...");
                    WAITING_FOR_FILE_STATUS.to_string()
                }
                _ => {
                    log::info!("{err}. Waiting for the next tick...");
                    format!("Still waiting for data: {err}")
                }
            };
            return TickOutput {
                chart: ChartDescription::placeholder(WAITING_TITLE),
                status,
                metrics: self.known_metrics.clone(),
                selected_metric: None,
                outcome: TickOutcome::Waiting,
            };
        }
        log::warn!("Error reading data: {err}");
        self.stats.failures += 1;
        TickOutput {
            chart: ChartDescription::placeholder(READ_ERROR_TITLE),
            status: format!("Error reading data: {err}"),
            metrics: self.known_metrics.clone(),
            selected_metric: None,
            outcome: TickOutcome::ReadFailed,
        }
    }

    /// Check the version and read if needed, inline or on a worker bounded
    /// by the read timeout.
    ///
    /// A worker that outlives its tick is kept as `pending`; the next tick
    /// that finds it finished discards its result and starts afresh.
    fn fetch_source(&mut self, reusable: Option<SourceVersion>) -> FetchResult {
        let Some(timeout) = self.read_timeout else {
            let result = fetch(&*self.source, reusable);
            return self.count_read(result);
        };

        if let Some(rx) = self.pending.take() {
            match rx.try_recv() {
                Err(TryRecvError::Empty) => {
                    self.pending = Some(rx);
                    return Err(ReadError::InFlight);
                }
                Ok(_) | Err(TryRecvError::Disconnected) => {
                    log::debug!("Discarding stale read result of {}", self.source.describe());
                }
            }
        }

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        std::thread::spawn(move || {
            if tx.send(fetch(&*source, reusable)).is_err() {
                log::debug!("Read of {} finished after its session", source.describe());
            }
        });
        match rx.recv_timeout(timeout) {
            Ok(result) => self.count_read(result),
            Err(RecvTimeoutError::Timeout) => {
                self.pending = Some(rx);
                Err(ReadError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ReadError::Parse {
                path: self.source.describe().into(),
                message: "read worker terminated unexpectedly".to_string(),
            }),
        }
    }

    fn count_read(&mut self, result: FetchResult) -> FetchResult {
        if let Ok(Fetch::Fresh(..)) = &result {
            self.stats.reads += 1;
        }
        result
    }
}

fn updated_at() -> String {
    format!("Last updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}
