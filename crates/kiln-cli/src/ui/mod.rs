//! Terminal output: status messages, the build summary and the target table.
//!
//! Everything except `kiln targets` output goes to stderr, so stdout stays
//! clean for `--json`.
//!
//! ```no_run
//! use kiln_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Built 3 targets");
//! ui::error("minified: binary not found");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{TargetRow, format_duration, format_size, print_build_summary, print_target_table};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// NO_COLOR wins over FORCE_COLOR; otherwise colors follow whether stderr
/// is attended.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr() && !is_ci()
}

/// Decide color support once, early in main. `--no-color` always wins.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLORS.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Apply `style` only when colors are enabled.
pub(crate) fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if colors_enabled() {
        style(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_should_use_color_no_color_overrides_force() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        let enabled = should_use_color();
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
        assert!(!enabled);
    }

    #[test]
    #[serial]
    fn test_is_ci_with_ci_var() {
        unsafe { std::env::set_var("CI", "true") };
        let ci = is_ci();
        unsafe { std::env::remove_var("CI") };
        assert!(ci);
    }

    #[test]
    #[serial]
    fn test_no_color_flag_disables_paint() {
        init_colors(true);
        assert!(!colors_enabled());
        assert_eq!(paint("ok", |s| format!("<{}>", s)), "ok");
    }
}
