//! Build command implementation.

use std::time::Instant;

use crate::cli::BuildArgs;
use crate::commands::utils::{self, command_cwd};
use crate::config::{KilnConfig, ResolvedProject};
use crate::error::{BuildError, Result, ResultExt};
use crate::ui;
use kiln_bundler::BuildReport;

/// Execute the build command.
///
/// 1. Load and validate configuration (CLI > env > file > defaults)
/// 2. Resolve metadata from the manifest and prepare the output directory
/// 3. Run the pipeline on a blocking thread
/// 4. Print the summary; fail if any target failed
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start = Instant::now();
    let cwd = command_cwd(args.cwd.as_deref())?;

    let config = KilnConfig::load(&args, &cwd)?;
    config.validate()?;
    let project = config.resolve(&cwd)?;
    project.validate()?;

    utils::validate_output_dir(&project.out_dir, &cwd)?;
    if project.clean {
        ui::info(&format!(
            "Cleaning output directory: {}",
            project.out_dir.display()
        ));
        utils::clean_output_dir(&project.out_dir).context("Failed to clean output directory")?;
    } else {
        utils::ensure_output_dir(&project.out_dir)?;
    }

    ui::info(&format!(
        "Packaging {} v{} ({} targets)",
        project.metadata.name,
        project.metadata.version,
        project.targets.len()
    ));

    if !project.binary.exists() {
        ui::warning(&format!(
            "Binary not found: {}. Inlining targets will fail; external targets load it at runtime",
            project.binary.display()
        ));
    }

    let report = run_pipeline(&project).await?;
    ui::print_build_summary(&report, &project.out_dir);

    finish(&report, start)
}

async fn run_pipeline(project: &ResolvedProject) -> Result<BuildReport> {
    let pipeline = project.pipeline();
    let report = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .map_err(|e| BuildError::Custom(format!("Build task failed: {}", e)))??;
    Ok(report)
}

fn finish(report: &BuildReport, start: Instant) -> Result<()> {
    if report.is_success() {
        ui::success(&format!(
            "Built {} targets in {}",
            report.len(),
            ui::format_duration(start.elapsed())
        ));
        return Ok(());
    }

    Err(BuildError::TargetsFailed {
        failed: report.failures().map(|(id, _)| id.to_string()).collect(),
        total: report.len(),
    }
    .into())
}
