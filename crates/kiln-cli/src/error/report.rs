//! Conversion of CLI errors into miette reports.

use ::miette::Report;

use crate::error::{BuildError, CliError};

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => bundler_error_to_miette(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => ::miette::miette!("Configuration error: {}", e),
        other => ::miette::miette!("{}", other),
    }
}

/// Convert BuildError to miette Report
fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::TargetsFailed { failed, total } => ::miette::miette!(
            code = "TARGETS_FAILED",
            help = "Run with --verbose for per-stage detail",
            "{} of {} targets failed: {}",
            failed.len(),
            total,
            failed.join(", ")
        ),
        other => ::miette::miette!("{}", other),
    }
}

/// Convert a kiln-bundler error, keeping its code and help text.
pub fn bundler_error_to_miette(err: kiln_bundler::Error) -> Report {
    Report::new(err)
}
