//! Kiln CLI - multi-target packaging for precompiled WebAssembly.
//!
//! This crate provides the `kiln` command on top of `kiln-bundler`:
//!
//! - [`error`] - CLI error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status messages and the build summary
//! - `commands` - `kiln build` and `kiln targets`
//! - `config` - `kiln.config.json` + `KILN_*` environment + CLI flags
//!
//! # Example
//!
//! ```rust
//! use kiln_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
