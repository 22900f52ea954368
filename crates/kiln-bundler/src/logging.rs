//! Subscriber setup for applications embedding kiln-bundler.
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber; kiln itself only emits `tracing` events and spans (one
//! `target` span per build target).

use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Verbosity of kiln's own output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    /// Errors and warnings, including missing external binaries
    Warn,
    /// One line per target (default)
    #[default]
    Info,
    /// Per-stage detail
    Debug,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn as_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

fn install(filter: EnvFilter) {
    // another subscriber may already be installed by the host application
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).without_time())
        .try_init();
}

/// Install a global subscriber at `level`; `RUST_LOG` directives still apply.
///
/// Only the first call in a process has any effect.
///
/// ```rust,no_run
/// use kiln_bundler::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.as_level_filter().into())
            .from_env_lossy();
        install(filter);
    });
}

/// Install a global subscriber configured by `RUST_LOG`, falling back to info.
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::Info.as_filter()));
        install(filter);
    });
}
