//! `phplot` binary: live pH dashboard for a CSV file.
//!
//! Usage:
//!     phplot pH_data.csv
//!     phplot data.csv --interval 2 --metric pH_free
//!     phplot --config dashboard.yaml --once

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phplot::{run_dashboard, DashboardConfig, RefreshSession};

#[derive(Parser, Debug)]
#[command(name = "phplot")]
#[command(about = "Live pH plot with outlier highlighting")]
struct Args {
    /// CSV file to watch (overrides the config file)
    path: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    interval: Option<f64>,

    /// Metric column to plot initially
    #[arg(short, long)]
    metric: Option<String>,

    /// Run a single refresh and print the result as JSON instead of opening a window
    #[arg(long)]
    once: bool,
}

fn load_config(args: &Args) -> Result<DashboardConfig, phplot::ConfigError> {
    let mut cfg = match &args.config {
        Some(path) => DashboardConfig::load_from_path(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(p) = &args.path {
        cfg.data_path = p.clone();
    }
    if let Some(i) = args.interval {
        cfg.poll_interval_secs = i;
    }
    if let Some(m) = &args.metric {
        cfg.initial_metric = Some(m.clone());
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.once {
        let mut session =
            RefreshSession::for_path(cfg.data_path.clone()).with_read_timeout(cfg.read_timeout());
        let output = session.tick(cfg.initial_metric.as_deref());
        return match serde_json::to_string_pretty(&output) {
            Ok(s) => {
                println!("{s}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to serialize tick output: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match run_dashboard(cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Dashboard exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}
