//! Logging setup with daily file rotation
//!
//! # Example
//!
//! ```no_run
//! use donut_core::logging::init_logging;
//!
//! let _guard = init_logging("logs", "donut-agent.log", "info").unwrap();
//! ```

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Initialize logging to stdout and a daily rotated file
///
/// - `directory`: Directory to store logs
/// - `filename_prefix`: Prefix for log files (e.g. "donut-agent.log")
/// - `level`: Default log level (e.g. "info", "debug")
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(directory: &str, filename_prefix: &str, level: &str) -> Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(filename_prefix)
        .build(directory)
        .map_err(|e| Error::Internal(format!("Failed to create log appender: {}", e)))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Stdout: human readable
    let stdout_layer = fmt::layer().with_target(false).compact();

    // File: full text, no colors
    let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to init tracing: {}", e)))?;

    Ok(guard)
}

/// Initialize logging from the agent's [`LoggingConfig`]
pub fn init_from_config(config: &LoggingConfig) -> Result<WorkerGuard> {
    init_logging(&config.directory, &config.file_prefix, &config.level)
}
