//! Tracing setup: console output plus a persistent log file.
//!
//! The file is truncated on every start, so it only ever holds the
//! current run. ANSI colours are disabled on the file layer.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("Cannot open log file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Logging already initialised: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let file_layer = match config.file_path() {
        Some(path) => {
            let file = create_log_file(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Create (or truncate) the log file.
pub fn create_log_file(path: &Path) -> Result<File, LoggingError> {
    File::create(path).map_err(|source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_is_truncated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Cell-Data.log");
        std::fs::write(&path, "previous run\n").expect("seed log");

        let mut file = create_log_file(&path).expect("create");
        writeln!(file, "fresh").expect("write");
        drop(file);

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "fresh\n");
    }

    #[test]
    fn test_unwritable_log_path() {
        let err = create_log_file(Path::new("/nonexistent-dir/x.log")).expect_err("should fail");
        assert!(err.to_string().contains("/nonexistent-dir/x.log"));
    }
}
