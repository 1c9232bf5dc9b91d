//! Tracing subscriber setup for the `tomatick` binary.
//!
//! Logs go to stderr so command output on stdout stays parseable.
//!
//! # Priority (highest to lowest)
//!
//! 1. `TOMATICK_LOG` env var (per-target directives, e.g. `tomatick_core=debug`)
//! 2. `RUST_LOG` env var
//! 3. CLI flags (`-v` → debug, `-q` → error)
//! 4. `logging.level` from the config file

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TOMATICK_LOG";

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    /// No flag given; the config decides.
    Normal,
    Verbose,
}

impl Verbosity {
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    const fn level(self) -> Option<Level> {
        match self {
            Self::Quiet => Some(Level::ERROR),
            Self::Normal => None,
            Self::Verbose => Some(Level::DEBUG),
        }
    }
}

/// Install the global subscriber. Call once, before any command runs.
pub fn init(verbosity: Verbosity, config_level: &str) {
    let filter = build_filter(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
        verbosity,
        config_level,
    );

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Verbose)
        .without_time()
        .compact();

    // A second init (tests calling main twice) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn build_filter(
    project_env: Option<&str>,
    rust_log: Option<&str>,
    verbosity: Verbosity,
    config_level: &str,
) -> EnvFilter {
    for directives in [project_env, rust_log].into_iter().flatten() {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }

    if let Some(level) = verbosity.level() {
        return EnvFilter::new(level.as_str());
    }

    EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()))
}
