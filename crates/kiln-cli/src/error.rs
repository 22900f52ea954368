//! Error handling for the kiln CLI.
//!
//! - [`CliError`] is what every command returns
//! - [`ConfigError`] and [`BuildError`] carry the domain detail, each with a hint
//! - [`ResultExt`] attaches paths, hints and context at call sites
//!
//! ```rust,no_run
//! use kiln_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_manifest(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Point 'manifest' at the crate's Cargo.toml")
//! }
//! ```

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::{bundler_error_to_miette, cli_error_to_miette};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad file, bad values, unreadable manifest)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build process errors (failed targets, unwritable output)
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Errors raised by the packaging pipeline before any target ran
    #[error(transparent)]
    Bundler(#[from] kiln_bundler::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicit `--config` path does not exist
    #[error("Config file not found: {}\n\nHint: Create a kiln.config.json file or drop --config", .0.display())]
    NotFound(PathBuf),

    /// Sources could not be merged into a configuration
    #[error("Invalid configuration: {0}\n\nHint: Check kiln.config.json syntax, field names and KILN_* variables")]
    Invalid(String),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// The package manifest could not be read or parsed
    #[error("Cannot read manifest {}: {message}\n\nHint: Set 'manifest' or provide 'metadata' explicitly", .path.display())]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// One or more targets failed; the others were still written
    #[error("{} of {total} targets failed: {}\n\nHint: Run with --verbose for per-stage detail", .failed.len(), .failed.join(", "))]
    TargetsFailed {
        /// Ids of the failed targets, in declaration order
        failed: Vec<String>,
        /// Number of declared targets
        total: usize,
    },

    /// Output directory is not writable or not allowed
    #[error("Output directory is not writable: {}\n\nHint: Check directory permissions or specify a different --out-dir", .0.display())]
    OutputNotWritable(PathBuf),

    /// Generic build error
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
