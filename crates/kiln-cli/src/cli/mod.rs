//! Command-line interface definition for kiln.
//!
//! - `kiln build` - package the wasm-bindgen output for every declared target
//! - `kiln targets` - print the resolved target table without building

mod commands;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command, TargetsArgs};
pub use validation::{parse_global, parse_year};

/// kiln - multi-target packaging for WebAssembly libraries
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Package a WebAssembly library for browsers, Node.js and production",
    long_about = "kiln wraps wasm-bindgen glue into one artifact per declared target:\n\
                  a UMD build with an external .wasm, a CommonJS build for Node.js,\n\
                  and a minified UMD build with the binary inlined and a provenance banner."
)]
pub struct Cli {
    /// Enable verbose logging (per-stage detail)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
