//! Logging setup for groundlayer tools.
//!
//! Structured logging with dual output:
//! - Writes to `logs/groundlayer.log` (cleared on session start)
//! - Also prints to stdout for terminal tailing
//! - Compact single-line format; tile traffic is one event per line
//! - Filterable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive; dropping it flushes and closes the log.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initializes the global logging subscriber.
///
/// Creates the log directory if needed, clears the previous session's log
/// file, and wires both the file and stdout outputs. May be called once
/// per process.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files (e.g. "logs")
/// * `log_file` - Log file name (e.g. "groundlayer.log")
///
/// # Errors
///
/// Fails when the log directory cannot be created or the log file cannot
/// be cleared.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Truncate the previous session's log.
    let log_path = Path::new(log_dir).join(log_file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .compact();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    // Default to INFO when RUST_LOG is unset.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "groundlayer.log"
}
