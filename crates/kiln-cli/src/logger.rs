//! Logging setup for the kiln CLI.
//!
//! Verbosity, in order of precedence:
//! 1. `--verbose`: debug for kiln crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for kiln crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "kiln_bundler=debug,kiln_cli=debug";
const QUIET_FILTER: &str = "kiln_bundler=error,kiln_cli=error";
const DEFAULT_FILTER: &str = "kiln_bundler=info,kiln_cli=info";

/// Build the filter for the given global flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
///
/// ```rust,no_run
/// use kiln_cli::logger::init_logger;
///
/// // debug output, no ANSI colors
/// init_logger(true, false, true);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
