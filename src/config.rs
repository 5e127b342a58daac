//! Dashboard configuration.
//!
//! Every field has a default, so a YAML file only needs the keys it wants to
//! change. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors while loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the dashboard.
///
/// | Field               | Purpose |
/// |---------------------|---------|
/// | `data_path`         | CSV file to poll |
/// | `poll_interval_secs`| Timer period between ticks |
/// | `read_timeout_secs` | Upper bound on one read; `None` reads inline |
/// | `title`             | Native window title |
/// | `headline`          | Heading shown above the plot |
/// | `initial_metric`    | Metric to plot before the user picks one |
/// | `window_size`       | Initial window size in points |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub poll_interval_secs: f64,
    pub read_timeout_secs: Option<f64>,
    pub title: String,
    pub headline: String,
    pub initial_metric: Option<String>,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("pH_data.csv"),
            poll_interval_secs: 5.0,
            read_timeout_secs: Some(2.0),
            title: "mFET pH Plot".to_string(),
            headline: "mFET pH vs Time Plot".to_string(),
            initial_metric: None,
            window_size: [1200.0, 800.0],
        }
    }
}

impl DashboardConfig {
    /// Load a YAML file and validate it.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&s).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: DashboardConfig = serde_yaml::from_str(s).map_err(|source| ConfigError::Yaml {
            path: PathBuf::new(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.poll_interval_secs.is_finite() && self.poll_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_secs must be positive, got {}",
                self.poll_interval_secs
            )));
        }
        if let Some(t) = self.read_timeout_secs {
            if !(t.is_finite() && t > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "read_timeout_secs must be positive, got {t}"
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs_f64)
    }
}
