//! Tracing subscriber initialization.
//!
//! Logs go to stderr by default so they never mix with generated output.
//! With a configured log file they are appended there instead.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Level filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG`; otherwise logs at `info`, or `debug` when
/// `verbose` is set. Output goes to `log_path` when given (its directory is
/// created if missing), else to stderr. ANSI colors are never emitted.
///
/// # Errors
///
/// Returns `LoggingError` if the subscriber was already initialized or the
/// log file location is unusable.
pub fn init(log_path: Option<&Path>, verbose: bool) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false);

    match log_path {
        Some(path) => {
            let (directory, file_name) = prepare_log_file(path)?;
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            builder
                .with_writer(file_appender)
                .try_init()
                .map_err(|_| LoggingError::SubscriberAlreadySet)
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet),
    }
}

/// Split `log_path` into directory and file name, creating the directory.
fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?
        .to_string();

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
