//! Logging setup for the `fob-unpack` binary.
//!
//! The core crate only emits `tracing` events. This module installs the
//! subscriber that renders them: compact lines on stderr, so `--json` output
//! on stdout stays machine-readable.
//!
//! # Example
//!
//! ```rust,no_run
//! use fob_unpack_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Unpacking {}", "bundle.js");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "fob_unpack=debug,fob_unpack_cli=debug";
const QUIET_FILTER: &str = "fob_unpack=error,fob_unpack_cli=error";
const DEFAULT_FILTER: &str = "fob_unpack=warn,fob_unpack_cli=info";

/// Initialize the tracing subscriber.
///
/// Level selection, first match wins:
/// 1. `--verbose`: debug for the fob-unpack crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. warnings from the core, info from the CLI
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the subscriber with an explicit filter.
///
/// ```rust,no_run
/// use fob_unpack_cli::logger::init_logger_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_logger_with_filter(EnvFilter::new("fob_unpack=trace"), true);
/// ```
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
