//! Logging bootstrap for the reading tracker.
//!
//! Wires `tracing` to a rolling file sink plus a console layer so the app
//! keeps a persistent, low-noise diagnostic trail. [`init`] is meant to be
//! called once from the shell at launch; calling it again just hands back the
//! handle installed by the first call.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

const ENV_FILTER_VARS: [&str; 2] = ["SHELF_LOG", "RUST_LOG"];

static LOG_HANDLE: OnceLock<LogHandle> = OnceLock::new();

/// Re-export so callers never name `tracing-subscriber` directly.
pub use tracing_subscriber::filter::LevelFilter as LogLevel;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory that holds the rolling log files.
    pub directory: PathBuf,
    /// File name prefix for generated log files (suffix is `.log`).
    pub file_prefix: String,
    /// Maximum number of rolled files to keep. `None` disables pruning.
    pub retention: Option<usize>,
    /// Minimum level written to the file sink.
    pub file_level: LevelFilter,
    /// Minimum level written to stderr.
    pub console_level: LevelFilter,
    /// Forward `log` crate records into `tracing`.
    pub capture_log: bool,
    /// Optional filter directive (e.g. `shelf_core=debug,reqwest=info`).
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        let console_level =
            if cfg!(debug_assertions) { LevelFilter::INFO } else { LevelFilter::WARN };

        let env_filter = ENV_FILTER_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|directive| !directive.trim().is_empty());

        Self {
            directory: default_log_directory(),
            file_prefix: "shelf".to_string(),
            retention: Some(7),
            file_level: LevelFilter::DEBUG,
            console_level,
            capture_log: true,
            env_filter,
        }
    }
}

impl LogConfig {
    pub fn with_directory<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.directory = path.into();
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.file_prefix = prefix.into();
        self
    }
}

/// Handle returned from [`init`] that owns the background logging worker.
#[derive(Debug)]
pub struct LogHandle {
    _guard: tracing_appender::non_blocking::WorkerGuard,
    directory: PathBuf,
}

impl LogHandle {
    /// Directory backing the rolling file sink.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Initialise the global logging subscriber. The first invocation wins; later
/// calls ignore their configuration and return the original handle.
pub fn init(config: LogConfig) -> Result<&'static LogHandle> {
    if let Some(handle) = LOG_HANDLE.get() {
        return Ok(handle);
    }

    let handle = setup(config)?;
    let _ = LOG_HANDLE.set(handle);
    Ok(LOG_HANDLE.get().expect("log handle initialised"))
}

fn setup(config: LogConfig) -> Result<LogHandle> {
    if config.capture_log {
        install_log_tracer(config.file_level, config.console_level);
    }

    fs::create_dir_all(&config.directory)
        .with_context(|| format!("creating log directory at {}", config.directory.display()))?;

    if let Some(retention) = config.retention.filter(|r| *r > 0) {
        prune_old_logs(&config.directory, &config.file_prefix, retention)
            .context("applying log retention policy")?;
    }

    let rolling = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(config.directory.clone())
        .context("creating rolling log appender")?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling);

    let directive = config
        .env_filter
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| if cfg!(debug_assertions) { "debug" } else { "info" }.to_string());
    let env_filter = EnvFilter::try_new(directive).context("parsing env filter directive")?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_file(true)
        .with_line_number(true)
        .with_filter(config.file_level);

    let console_layer =
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(config.console_level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(LogHandle { _guard: guard, directory: config.directory })
}

fn install_log_tracer(file_level: LevelFilter, console_level: LevelFilter) {
    let max_level = match file_level.cmp(&console_level) {
        Ordering::Greater => file_level,
        _ => console_level,
    };

    let log_level = match max_level {
        LevelFilter::OFF => log::LevelFilter::Off,
        LevelFilter::ERROR => log::LevelFilter::Error,
        LevelFilter::WARN => log::LevelFilter::Warn,
        LevelFilter::INFO => log::LevelFilter::Info,
        LevelFilter::DEBUG => log::LevelFilter::Debug,
        LevelFilter::TRACE => log::LevelFilter::Trace,
    };

    let _ = tracing_log::LogTracer::builder().with_max_level(log_level).init();
}

fn prune_old_logs(dir: &Path, prefix: &str, retention: usize) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading log directory at {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.metadata().map(|meta| meta.is_file()).unwrap_or(false))
        .filter(|entry| matches_prefix(&entry.path(), prefix))
        .map(|entry| {
            let modified =
                entry.metadata().and_then(|meta| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
            (entry.path(), modified)
        })
        .collect();

    if entries.len() <= retention {
        return Ok(());
    }

    entries.sort_by_key(|(_, modified)| *modified);
    let excess = entries.len().saturating_sub(retention);
    for (path, _) in entries.into_iter().take(excess) {
        let _ = fs::remove_file(&path);
    }

    Ok(())
}

fn matches_prefix(path: &Path, prefix: &str) -> bool {
    path.file_stem().and_then(OsStr::to_str).map(|stem| stem.starts_with(prefix)).unwrap_or(false)
}

fn default_log_directory() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "Shelf", "shelf") {
        dirs.data_dir().join("logs")
    } else {
        std::env::temp_dir().join("shelf-logs")
    }
}
