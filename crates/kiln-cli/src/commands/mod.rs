//! Command implementations for the kiln CLI.
//!
//! - [`build`] - package every declared target
//! - [`targets`] - show the resolved target table
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod build;
pub mod targets;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use targets::execute as targets_execute;
pub use utils::{clean_output_dir, ensure_output_dir, get_cwd, resolve_path};
