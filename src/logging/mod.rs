//! Tracing subscriber initialization.
//!
//! The simulation binary logs to a file by default so its stdout stays
//! machine-readable; `--log-stderr` switches to stderr for interactive runs.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

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

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Append to a file, creating its directory.
    File(PathBuf),
    /// Write to stderr, for the simulation binary and tests.
    Stderr,
}

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Fails if the log directory cannot be created, the path has no file name, or a
/// subscriber is already installed.
pub fn init(destination: &LogDestination) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match destination {
        LogDestination::File(path) => {
            let (directory, file_name) = prepare_log_file(path)?;
            let file_appender = tracing_appender::rolling::never(directory, file_name);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(file_appender)
                .with_ansi(false) // No ANSI colors in log files
                .try_init()
                .map_err(|_| LoggingError::SubscriberAlreadySet)
        }
        LogDestination::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet),
    }
}

/// Create the log directory and split `path` into directory and file name.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let directory = match path.parent() {
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
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn prepare_log_file_creates_missing_directory() {
        let test_dir = std::env::temp_dir().join("spineview_test_logs_create");
        let _ = fs::remove_dir_all(&test_dir);

        let (directory, file_name) =
            prepare_log_file(&test_dir.join("views.log")).expect("should prepare");

        assert!(test_dir.exists(), "Log directory should be created: {:?}", test_dir);
        assert_eq!(directory, test_dir);
        assert_eq!(file_name, "views.log");

        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    fn prepare_log_file_uses_current_dir_for_bare_file_name() {
        let (directory, file_name) =
            prepare_log_file(Path::new("spineview.log")).expect("should prepare");

        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, "spineview.log");
    }

    #[test]
    fn prepare_log_file_rejects_path_without_file_name() {
        let result = prepare_log_file(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("spineview_test_logs_twice");
        let destination = LogDestination::File(test_dir.join("twice.log"));

        // The first call may already fail if another test installed a subscriber.
        let _ = init(&destination);
        let second = init(&destination);

        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));

        let _ = fs::remove_dir_all(&test_dir);
    }
}
