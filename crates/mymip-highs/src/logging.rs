//! Structured logging setup.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const TRACE_ENV: &str = "MYMIP_TRACE";
pub const LOG_FORMAT_ENV: &str = "MYMIP_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "MYMIP_LOG_FILE";

#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile { path: String, source: io::Error },
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOGGING_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOGGING_INVALID_FORMAT",
            LoggingError::LogFile { .. } => "LOGGING_LOG_FILE",
            LoggingError::Init(_) => "LOGGING_INIT_FAILED",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => {
                write!(f, "[{}] Invalid log filter: {msg}", self.code())
            }
            LoggingError::InvalidFormat(value) => write!(
                f,
                "[{}] Invalid {LOG_FORMAT_ENV} '{value}' (expected 'json' or 'pretty')",
                self.code()
            ),
            LoggingError::LogFile { path, source } => {
                write!(f, "[{}] Failed to open log file {path}: {source}", self.code())
            }
            LoggingError::Init(msg) => {
                write!(f, "[{}] Failed to initialize logging: {msg}", self.code())
            }
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_string(),
            source,
        })
}

fn map_init_err<E: std::fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

/// Parse a `MYMIP_LOG_FORMAT` value; `true` means json.
fn parse_format(format: &str) -> Result<bool, LoggingError> {
    if format.eq_ignore_ascii_case("json") {
        Ok(true)
    } else if format.eq_ignore_ascii_case("pretty") {
        Ok(false)
    } else {
        Err(LoggingError::InvalidFormat(format.to_string()))
    }
}

/// Install a global `tracing` subscriber.
///
/// When `level` is `None`, this reads `MYMIP_TRACE` (default `off`).
/// `MYMIP_LOG_FORMAT` picks `pretty` or `json` output on stderr and
/// `MYMIP_LOG_FILE` adds a plain-text copy to a file. Returns `Ok(false)` if a
/// subscriber is already installed.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    let use_json = parse_format(&format)?;
    let log_file = env::var(LOG_FILE_ENV).ok();

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    tracing::debug!(
        component = "logging",
        operation = "init",
        status = "success",
        level = %level_value,
        json = use_json,
        "Logging enabled"
    );
    Ok(true)
}
