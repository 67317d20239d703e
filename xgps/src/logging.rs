//! Logging setup for the `xgps` binary.
//!
//! - Writes to `~/.xgps/xgps.log` by default (cleared on session start)
//! - Mirrors events to stderr so stdout stays free for command output
//! - Filter comes from `RUST_LOG`, falling back to `info` (`debug` when
//!   verbose)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking file writer alive. Dropping it flushes the log.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// Creates `log_dir` if needed and truncates `log_file` inside it.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be truncated.
pub fn init_logging(log_dir: &Path, log_file: &str, verbose: bool) -> io::Result<LoggingGuard> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and empty the log file.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file);
    fs::write(&path, "")?;
    Ok(path)
}

fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = default_directive(verbose);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "xgps.log"
}
