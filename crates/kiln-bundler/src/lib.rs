#![cfg_attr(docsrs, feature(doc_cfg))]

//! # kiln-bundler
//!
//! Packages a precompiled WebAssembly artifact and its glue script into several
//! distributable bundles from a single declarative target table.
//!
//! Every target runs the same stage chain:
//!
//! 1. **Binary integration** - wraps the glue in a UMD or CommonJS module and
//!    either references the `.wasm` file at runtime or inlines it as base64.
//! 2. **Minification** - only for targets with `minify` set (oxc minifier).
//! 3. **Provenance banner** - a single unmapped comment line on top.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiln_bundler::{Pipeline, ProjectMetadata};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = ProjectMetadata {
//!     name: "mbd-wasm".into(),
//!     homepage: "https://example.com/mbd".into(),
//!     version: "0.1.0".into(),
//!     author: "Jane Doe".into(),
//! };
//!
//! let report = Pipeline::new(&metadata, "pkg/mbd.js", "pkg/mbd_bg.wasm")
//!     .out_dir("dist")
//!     .run()?;
//!
//! for (id, outcome) in report.outcomes() {
//!     match outcome {
//!         Ok(artifact) => println!("{id}: {}", artifact.code_file.display()),
//!         Err(err) => eprintln!("{id}: {err}"),
//!     }
//! }
//! assert!(report.is_success());
//! # Ok(()) }
//! ```

use std::path::PathBuf;

pub mod banner;
pub mod binary;
pub mod minify;
pub mod output;
pub mod pipeline;
pub mod plugins;
pub mod sourcemap;
pub mod target;
pub mod wrapper;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use banner::{ProjectMetadata, ProvenanceBanner};
pub use binary::{BinaryAdapter, BinarySource, BinaryStrategy};
pub use minify::{OxcMinifier, Transform, TransformError};
pub use output::{BuildReport, OutputArtifact};
pub use pipeline::Pipeline;
pub use plugins::{Chunk, Companion, PluginChain, Stage, StageContext, StagePhase};
pub use target::{BuildTarget, OutputFormat, TargetSpec, Variant, default_targets};
pub use wrapper::EntryPoint;

/// Re-exported so callers can inspect generated maps without a direct dependency.
pub use oxc_sourcemap::SourceMap;

/// Error types for kiln-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single target is misconfigured (unknown format, bad output, broken entry).
    #[error("Invalid configuration for target '{target}': {message}")]
    InvalidConfig { target: String, message: String },

    /// The target table as a whole is inconsistent.
    #[error("Invalid target table: {0}")]
    InvalidTargetTable(String),

    /// The glue entry point could not be read or does not satisfy the glue contract.
    #[error("Invalid entry point {}: {message}", .path.display())]
    InvalidEntry { path: PathBuf, message: String },

    /// The binary artifact is required at build time but could not be read.
    #[error("Binary artifact not readable: {} ({source})", .path.display())]
    AssetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transform stage (minifier) rejected generated code.
    #[error("Transform failed for target '{target}': {message}")]
    Transform { target: String, message: String },

    /// Source map bookkeeping went wrong.
    #[error("Source map error: {0}")]
    SourceMap(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for kiln-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Per-target configuration error.
    pub fn config(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether this failure belongs to the configuration category.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. } | Error::InvalidTargetTable(_) | Error::InvalidEntry { .. }
        )
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidConfig { .. } => "INVALID_CONFIG",
            Error::InvalidTargetTable(_) => "INVALID_TARGET_TABLE",
            Error::InvalidEntry { .. } => "INVALID_ENTRY",
            Error::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            Error::Transform { .. } => "TRANSFORM_ERROR",
            Error::SourceMap(_) => "SOURCEMAP_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidConfig { target, .. } => Some(Box::new(format!(
                "Check the declaration of target '{}' in your configuration file.",
                target
            ))),
            Error::InvalidTargetTable(_) => Some(Box::new(
                "Every target needs a unique id and output files that do not overlap.",
            )),
            Error::InvalidEntry { .. } => Some(Box::new(
                "The entry must be a classic script declaring the init function that instantiates the binary module.",
            )),
            Error::AssetNotFound { path, .. } => Some(Box::new(format!(
                "Inlined targets need '{}' at build time. Run the WebAssembly build first.",
                path.display()
            ))),
            Error::Transform { .. } => Some(Box::new(
                "The minifier rejected generated code. This is a code generation bug, not a transient failure.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays within the output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}
