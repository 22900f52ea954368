//! Targets command: print the resolved target table.

use serde::Serialize;

use crate::cli::TargetsArgs;
use crate::commands::utils::command_cwd;
use crate::config::KilnConfig;
use crate::error::Result;
use crate::ui::{self, TargetRow};
use kiln_bundler::BuildTarget;
use kiln_bundler::target::validate_table;

/// One row of `kiln targets --json`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TargetEntry {
    Valid(BuildTarget),
    Invalid { id: String, error: String },
}

/// Execute the targets command.
///
/// Per-target configuration errors are shown in the table rather than
/// aborting; table-level errors (duplicate ids, colliding outputs) fail.
pub async fn execute(args: TargetsArgs) -> Result<()> {
    let cwd = command_cwd(args.cwd.as_deref())?;
    let config = KilnConfig::load_file_and_env(args.config.as_deref(), &cwd)?;
    config.validate()?;
    let project = config.resolve(&cwd)?;

    validate_table(&project.targets)?;

    let entries: Vec<TargetEntry> = project
        .targets
        .iter()
        .map(|spec| match spec.resolve() {
            Ok(target) => TargetEntry::Valid(target),
            Err(e) => TargetEntry::Invalid {
                id: spec.id.clone(),
                error: e.to_string(),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let rows: Vec<TargetRow> = entries
        .iter()
        .map(|entry| match entry {
            TargetEntry::Valid(target) => TargetRow::from_target(target),
            TargetEntry::Invalid { id, error } => TargetRow::invalid(id, error),
        })
        .collect();
    ui::print_target_table(&rows, &project.out_dir);
    Ok(())
}
