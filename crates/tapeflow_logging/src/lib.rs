//! Logging setup for the tapeflow binary.
//!
//! Two layers: a daily-rolled file under `<home>/logs` that records everything
//! the filter allows, and stderr, which stays at `warn` unless verbose.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tapeflow=info,tapeflow_db=info";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration for the binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Override for the log directory (defaults to `<home>/logs`).
    pub log_dir: Option<PathBuf>,
}

/// Keeps the background log writer alive; drop it only at exit.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize tracing with a rolling file writer and stderr output.
///
/// If the log directory can't be prepared, falls back to stderr only.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    } else {
        EnvFilter::new("warn")
    };

    let log_dir = config
        .log_dir
        .unwrap_or_else(tapeflow_protocol::paths::default_logs_dir);

    let mut guard = None;
    let file_layer = match file_appender(&log_dir, config.app_name) {
        Ok(appender) => {
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        Err(err) => {
            eprintln!(
                "Warning: file logging disabled ({}): {:#}",
                log_dir.display(),
                err
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

/// `<dir>/<app_name>.<date>.log`, rolled daily, last five days kept.
fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file for {}", app_name))
}
