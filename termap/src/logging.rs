//! File-based tracing setup.
//!
//! The terminal belongs to the map, so log output goes to a file through a
//! non-blocking appender. Keep the returned guard alive for the lifetime of
//! the process or buffered lines are lost on exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::EnvFilter;

/// Log file name used when no path is configured.
pub const DEFAULT_LOG_FILE: &str = "termap.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Log path has no file name: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Default log path: `~/.termap/termap.log`.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".termap")
        .join(DEFAULT_LOG_FILE)
}

/// Install a global subscriber writing to `path`.
///
/// `default_level` applies when `RUST_LOG` is unset.
pub fn init_logging(path: &Path, default_level: &str) -> Result<WorkerGuard, LoggingError> {
    let (directory, file_name) = split_path(path)?;
    fs::create_dir_all(&directory).map_err(|source| LoggingError::CreateDir {
        path: directory.clone(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(OffsetTime::new(offset, Rfc3339))
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(guard)
}

fn split_path(path: &Path) -> Result<(PathBuf, &std::ffi::OsStr), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, file_name))
}
