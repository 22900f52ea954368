//! Atomic file writing for target output.
//!
//! Every target produces up to three files: the code, its `.map` and the
//! companion binary. They are written as a unit:
//!
//! 1. All paths are validated to stay inside the output directory
//! 2. Every file is written to a `{name}.tmp` sibling
//! 3. Temp files are renamed onto their final names
//! 4. On any failure all temp files are removed and the target fails
//!
//! A failing target never leaves partially written files behind; a re-run
//! overwrites the previous output.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use super::OutputArtifact;
use crate::plugins::Chunk;
use crate::sourcemap::reference_comment;
use crate::target::BuildTarget;
use crate::{Error, Result};

/// Writes one target's chunk to `dir`.
///
/// When the target has sourcemaps enabled, the map's `file` is set to the
/// code file name and the code gets a trailing `//# sourceMappingURL=` line.
///
/// # Errors
///
/// - [`Error::SourceMap`] if the target wants a map and the chunk has none
/// - [`Error::InvalidOutputPath`] if a file would escape `dir`
/// - [`Error::WriteFailure`] if any I/O operation fails; nothing is left behind
///
/// # Examples
///
/// ```no_run
/// use kiln_bundler::output::writer::write_artifact;
/// use kiln_bundler::plugins::Chunk;
/// use kiln_bundler::TargetSpec;
/// use std::path::Path;
///
/// # fn main() -> kiln_bundler::Result<()> {
/// let target = TargetSpec {
///     id: "standard".into(),
///     format: "umd".into(),
///     output: "mbd.js".into(),
///     sourcemap: false,
///     inline_binary: false,
///     minify: false,
///     banner: None,
/// }
/// .resolve()?;
/// let chunk = Chunk { code: "void 0;\n".into(), ..Chunk::default() };
/// let artifact = write_artifact(Path::new("dist"), &target, chunk)?;
/// println!("wrote {} bytes", artifact.code_size);
/// # Ok(()) }
/// ```
pub fn write_artifact(dir: &Path, target: &BuildTarget, chunk: Chunk) -> Result<OutputArtifact> {
    let dir = validate_and_normalize_dir(dir)?;

    let Chunk {
        mut code,
        map,
        companion,
    } = chunk;

    let map_json = match target.sourcemap_path() {
        Some(map_path) => {
            let mut map = map.ok_or_else(|| {
                Error::SourceMap(format!(
                    "target '{}' requested a source map but none was generated",
                    target.id
                ))
            })?;
            map.set_file(&target.file_name());
            let map_name = map_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&reference_comment(&map_name));
            code.push('\n');
            Some((validate_output_path(&dir, &map_path)?, map.to_json_string()))
        }
        None => None,
    };

    let code_file = validate_output_path(&dir, &target.output_path)?;
    let mut stale_binary = None;
    let binary = match (target.binary_path(), companion) {
        (Some(expected), Some(companion)) => {
            if expected != companion.path {
                return Err(Error::InvalidOutputPath(format!(
                    "companion '{}' does not belong to target '{}'",
                    companion.path.display(),
                    target.id
                )));
            }
            Some((validate_output_path(&dir, &companion.path)?, companion.bytes))
        }
        (Some(expected), None) => {
            stale_binary = Some(validate_output_path(&dir, &expected)?);
            None
        }
        (None, _) => None,
    };

    let mut operations: Vec<(PathBuf, &[u8])> = vec![(code_file.clone(), code.as_bytes())];
    if let Some((path, json)) = &map_json {
        operations.push((path.clone(), json.as_bytes()));
    }
    if let Some((path, bytes)) = &binary {
        operations.push((path.clone(), bytes.as_slice()));
    }

    write_files_atomic(&operations)?;
    if let Some(path) = stale_binary {
        remove_if_present(&path)?;
    }

    tracing::debug!(
        target = %target.id,
        file = %code_file.display(),
        bytes = code.len(),
        "wrote target output"
    );

    Ok(OutputArtifact {
        target_id: target.id.clone(),
        format: target.format,
        code_size: code.len(),
        code_file,
        sourcemap_file: map_json.map(|(path, _)| path),
        binary_file: binary.map(|(path, _)| path),
    })
}

/// Removes whatever an earlier run wrote for `target` in `dir`.
///
/// Covers the code file, its map and its companion binary. Missing files
/// are not an error.
///
/// # Errors
///
/// - [`Error::InvalidOutputPath`] if a path would escape `dir`
/// - [`Error::WriteFailure`] if an existing file cannot be removed
pub fn remove_stale_outputs(dir: &Path, target: &BuildTarget) -> Result<()> {
    let dir = validate_and_normalize_dir(dir)?;
    let paths = std::iter::once(target.output_path.clone())
        .chain(target.sourcemap_path())
        .chain(target.binary_path());
    for path in paths {
        remove_if_present(&validate_output_path(&dir, &path)?)?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(file = %path.display(), "removed stale output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::WriteFailure(format!(
            "Failed to remove stale output '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Validates and normalizes a directory path.
///
/// Resolves `.` and `..` and makes the path absolute.
fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    let absolute = if cleaned.is_absolute() {
        cleaned
    } else {
        std::env::current_dir()
            .map_err(|e| {
                Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
            })?
            .join(&cleaned)
            .clean()
    };

    Ok(absolute)
}

/// Joins `file` onto `base_dir`, rejecting anything that escapes it.
///
/// `../x`, `/etc/x` and `a/../../x` are all rejected after cleaning.
fn validate_output_path(base_dir: &Path, file: &Path) -> Result<PathBuf> {
    if file.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(file.clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            file.display(),
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// `{name}.tmp` next to `path`; never collides with another output of the
/// same target since the full file name is kept.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes multiple files atomically with automatic rollback on failure.
///
/// Phase one writes every temp file, phase two renames them into place. A
/// failed rename also removes the files already renamed.
fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = temp_path(target_path);
        fs::write(&temp, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            let _ = fs::remove_file(&temp);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp.display(),
                e
            ))
        })?;

        temp_files.push((temp, target_path.clone()));
    }

    for (index, (temp, target_path)) in temp_files.iter().enumerate() {
        fs::rename(temp, target_path).map_err(|e| {
            cleanup_temp_files(&temp_files);
            remove_renamed(&temp_files[..index]);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

/// Removes files already renamed into place by a failed commit.
fn remove_renamed(renamed: &[(PathBuf, PathBuf)]) {
    for (_, target_path) in renamed {
        if let Err(e) = fs::remove_file(target_path) {
            tracing::warn!(
                file = %target_path.display(),
                error = %e,
                "failed to roll back output file"
            );
        }
    }
}

/// Best-effort removal of temp files; we are already failing.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp, _) in temp_files {
        if temp.exists() {
            if let Err(e) = fs::remove_file(temp) {
                tracing::warn!(
                    file = %temp.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}
