//! Status message functions for terminal output.

use owo_colors::OwoColorize;

use super::paint;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", |s| s.green().bold().to_string()), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", |s| s.blue().bold().to_string()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", |s| s.yellow().bold().to_string()),
        paint(message, |s| s.yellow().to_string())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", |s| s.red().bold().to_string()),
        paint(message, |s| s.red().to_string())
    );
}
