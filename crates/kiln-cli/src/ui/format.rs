//! Formatting utilities for sizes, durations, the build summary and the
//! target table.

use console::Term;
use kiln_bundler::{BuildReport, BuildTarget};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

use super::paint;

/// Format file size in human-readable format.
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn rule() -> String {
    let width = Term::stderr().size().1 as usize;
    "─".repeat(width.clamp(20, 80))
}

/// Print one line per target (in declaration order) to stderr: written files
/// and code size for successes, the error for failures.
pub fn print_build_summary(report: &BuildReport, out_dir: &Path) {
    eprintln!(
        "\n{} {}",
        paint("Build Summary", |s| s.bold().underline().to_string()),
        paint(&out_dir.display().to_string(), |s| s.dimmed().to_string())
    );
    eprintln!("{}", rule());

    let mut total_size = 0u64;
    for (id, outcome) in report.outcomes() {
        match outcome {
            Ok(artifact) => {
                total_size += artifact.code_size as u64;
                let mut extras = Vec::new();
                if let Some(map) = &artifact.sourcemap_file {
                    extras.push(map.display().to_string());
                }
                if let Some(binary) = &artifact.binary_file {
                    extras.push(binary.display().to_string());
                }
                eprintln!(
                    "  {} {:<10} {} {}{}",
                    paint("▸", |s| s.blue().to_string()),
                    id,
                    paint(&artifact.code_file.display().to_string(), |s| {
                        s.bright_white().bold().to_string()
                    }),
                    paint(&format_size(artifact.code_size as u64), |s| s.dimmed().to_string()),
                    if extras.is_empty() {
                        String::new()
                    } else {
                        paint(&format!(" (+ {})", extras.join(", ")), |s| {
                            s.dimmed().to_string()
                        })
                    }
                );
            }
            Err(err) => eprintln!(
                "  {} {:<10} {}",
                paint("✗", |s| s.red().bold().to_string()),
                id,
                paint(&err.to_string(), |s| s.red().to_string())
            ),
        }
    }

    eprintln!("{}", rule());
    let built = report.artifacts().count();
    eprintln!(
        "  {} {}/{} targets, {}",
        paint("Total:", |s| s.bold().to_string()),
        built,
        report.len(),
        paint(&format_size(total_size), |s| s.green().to_string())
    );
}

/// A row of `kiln targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRow {
    pub id: String,
    /// `umd`, `cjs`, or empty for invalid rows
    pub format: String,
    pub files: Vec<String>,
    /// `inline`, `external`, or the configuration error
    pub binary: String,
    pub flags: Vec<&'static str>,
    pub valid: bool,
}

impl TargetRow {
    pub fn from_target(target: &BuildTarget) -> Self {
        let mut files = vec![target.output_path.display().to_string()];
        files.extend(target.sourcemap_path().map(|p| p.display().to_string()));
        files.extend(target.binary_path().map(|p| p.display().to_string()));

        let mut flags = Vec::new();
        if target.minify {
            flags.push("minify");
        }
        if target.banner {
            flags.push("banner");
        }

        Self {
            id: target.id.clone(),
            format: target.format.to_string(),
            files,
            binary: if target.inline_binary { "inline" } else { "external" }.to_string(),
            flags,
            valid: true,
        }
    }

    pub fn invalid(id: &str, error: &str) -> Self {
        Self {
            id: id.to_string(),
            format: String::new(),
            files: Vec::new(),
            binary: error.to_string(),
            flags: Vec::new(),
            valid: false,
        }
    }
}

/// Print the target table to stdout.
pub fn print_target_table(rows: &[TargetRow], out_dir: &Path) {
    println!("{} {}", paint("Targets", |s| s.bold().to_string()), out_dir.display());
    for row in rows {
        if row.valid {
            println!(
                "  {:<10} {:<4} {:<9} {}{}",
                row.id,
                row.format,
                row.binary,
                row.files.join(", "),
                if row.flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", row.flags.join(", "))
                }
            );
        } else {
            println!(
                "  {:<10} {}",
                row.id,
                paint(&row.binary, |s| s.red().to_string())
            );
        }
    }
}
