//! Error types for the `fob-unpack` command line.
//!
//! Messages are written for the person at the terminal: each names the file or
//! setting involved and, where there is an obvious next step, ends with a
//! `Hint:` line.
//!
//! Failures inside the core pipeline stay [`UnpackError`]s so their miette
//! codes and help text survive to the final report.

mod miette;

use std::path::PathBuf;

use fob_unpack::{RuntimeError, UnpackError};
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Result type for CLI operations.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Top-level CLI error.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A bundle could not be unpacked.
    #[error(transparent)]
    Unpack(#[from] UnpackError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading a bundle or preparing an output directory failed.
    #[error("File system error: {0}\n\nHint: Check file permissions or pass a different --out-dir")]
    Runtime(#[from] RuntimeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Some bundles in a batch failed; the others were written.
    #[error("{failed} of {total} bundles failed to unpack")]
    Batch { failed: usize, total: usize },

    #[error("{0}")]
    Custom(String),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}\n\nHint: Create a fob-unpack.config.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Extension methods for attaching context to results.
pub trait ResultExt<T> {
    /// Turn a not-found I/O or runtime error into [`CliError::FileNotFound`]
    /// for `path`.
    ///
    /// ```rust,no_run
    /// # use fob_unpack::{NativeRuntime, Runtime};
    /// # use fob_unpack_cli::error::{Result, ResultExt};
    /// # use std::path::Path;
    /// # fn run() -> Result<()> {
    /// let bytes = NativeRuntime::new()
    ///     .read_file(Path::new("bundle.js"))
    ///     .with_path("bundle.js")?;
    /// # let _ = bytes;
    /// # Ok(())
    /// # }
    /// ```
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            CliError::Runtime(RuntimeError::FileNotFound(_)) => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("fob-unpack.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("fob-unpack.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "maxNodes".to_string(),
            value: "lots".to_string(),
            hint: "Use a positive integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'maxNodes': lots"));
        assert!(msg.contains("Hint: Use a positive integer"));
    }

    #[test]
    fn test_batch_error_message() {
        let err = CliError::Batch { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "1 of 3 bundles failed to unpack");
    }

    #[test]
    fn test_unpack_error_is_transparent() {
        let err = CliError::from(UnpackError::NoModuleTableFound);
        assert_eq!(err.to_string(), UnpackError::NoModuleTableFound.to_string());
    }

    #[test]
    fn test_with_path_maps_not_found() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let err = result.with_path("bundle.js").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p == &PathBuf::from("bundle.js")));
    }

    #[test]
    fn test_with_path_maps_runtime_not_found() {
        let result: std::result::Result<(), RuntimeError> =
            Err(RuntimeError::FileNotFound(PathBuf::from("/virtual/bundle.js")));
        let err = result.with_path("bundle.js").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p == &PathBuf::from("bundle.js")));
    }

    #[test]
    fn test_with_path_keeps_other_io_errors() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.with_path("bundle.js").unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_with_hint_appends_hint() {
        let result: Result<()> = Err(CliError::Custom("boom".into()));
        let msg = result.with_hint("try again").unwrap_err().to_string();
        assert_eq!(msg, "boom\n\nHint: try again");
    }

    #[test]
    fn test_context_prefixes_message() {
        let result: Result<()> = Err(CliError::Custom("boom".into()));
        let msg = result.context("Unpacking a.js").unwrap_err().to_string();
        assert_eq!(msg, "Unpacking a.js: boom");
    }
}
