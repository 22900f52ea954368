//! Shared utilities for command implementations.

use crate::error::{BuildError, CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Working directory for a command: `--cwd` if given, else the process's.
pub fn command_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let process_cwd = get_cwd()?;
    Ok(match cwd {
        Some(dir) => resolve_path(dir, &process_cwd),
        None => process_cwd,
    })
}

/// Clean an output directory by removing all its contents.
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns I/O errors if directory operations fail, or `InvalidArgument` if
/// the path exists and is not a directory.
pub fn clean_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "Output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }

        // Remove all contents but keep the directory itself
        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(out_dir)?;
    }

    Ok(())
}

/// Ensure an output directory exists, creating it if necessary.
pub fn ensure_output_dir(out_dir: &Path) -> Result<()> {
    if !out_dir.exists() {
        fs::create_dir_all(out_dir)?;
    } else if !out_dir.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Output path exists but is not a directory: {}",
            out_dir.display()
        )));
    }

    Ok(())
}

/// Refuse output directories outside the project (or a sibling of it), and
/// the project root itself.
///
/// # Errors
///
/// Returns `OutputNotWritable` if the directory is unsafe.
pub fn validate_output_dir(out_dir: &Path, cwd: &Path) -> Result<()> {
    let resolved = resolve_path(out_dir, cwd);
    let not_writable = || CliError::Build(BuildError::OutputNotWritable(resolved.clone()));

    let canonical_out = if resolved.exists() {
        resolved.canonicalize()?
    } else {
        // walk up to the nearest existing ancestor
        let mut existing = resolved.as_path();
        let mut missing = Vec::new();
        while !existing.exists() {
            missing.push(existing.file_name().ok_or_else(not_writable)?);
            existing = existing.parent().ok_or_else(not_writable)?;
        }
        let mut canonical = existing.canonicalize()?;
        canonical.extend(missing.iter().rev());
        canonical
    };
    let canonical_cwd = cwd.canonicalize()?;

    if canonical_out == canonical_cwd {
        return Err(not_writable());
    }

    let is_within_project = canonical_out.starts_with(&canonical_cwd);
    let is_sibling = canonical_out
        .parent()
        .and_then(|p| canonical_cwd.parent().map(|c| p == c))
        .unwrap_or(false);

    if !is_within_project && !is_sibling {
        return Err(not_writable());
    }

    Ok(())
}

/// Get the current working directory.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}
