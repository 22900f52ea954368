use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{parse_global, parse_year};

/// Available kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every declared target
    ///
    /// Writes one code file and source map per target, plus the external
    /// binary for targets that load it at runtime. The command fails if any
    /// target fails; successful targets are still written.
    Build(BuildArgs),

    /// Show the resolved target table
    ///
    /// Prints each target's format, output files and binary strategy without
    /// reading the entry point or writing anything.
    Targets(TargetsArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Path to a kiln.config.json file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// wasm-bindgen glue script
    ///
    /// Defaults to pkg/<name>.js, with dashes in the name replaced by
    /// underscores.
    #[arg(short, long, value_name = "FILE")]
    pub entry: Option<PathBuf>,

    /// Compiled WebAssembly binary
    ///
    /// Defaults to pkg/<name>_bg.wasm.
    #[arg(short, long, value_name = "FILE")]
    pub binary: Option<PathBuf>,

    /// Output directory for all targets
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Browser global assigned by UMD targets
    #[arg(short, long, value_parser = parse_global)]
    pub global_name: Option<String>,

    /// Copyright year stamped into the banner
    ///
    /// Defaults to the current year. Set it for reproducible builds.
    #[arg(long, value_parser = parse_year)]
    pub year: Option<i32>,

    /// Build targets one after another in declaration order
    #[arg(long)]
    pub sequential: bool,

    /// Empty the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Working directory for resolving relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the targets command
#[derive(Args, Debug, Default)]
pub struct TargetsArgs {
    /// Path to a kiln.config.json file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,

    /// Working directory for resolving relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
