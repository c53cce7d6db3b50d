//! Diagnostics for dmsuite.
//!
//! The library only emits `tracing` events. The `dmsitem` binary installs the
//! subscriber with [`init_logging`], writing to stderr because stdout carries
//! item JSON. Events from other crates are dropped unless `RUST_LOG` asks for
//! them.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the CLI reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above (`-v`).
    Verbose,
    /// Everything (`-vv` or more).
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the number of `-v` flags to a verbosity.
    /// `-q` wins over any `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Most detailed level that is still reported.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset, covering the library
    /// and the `dmsitem` binary.
    #[must_use]
    pub fn directive(&self) -> String {
        let level = self.to_level_filter();
        format!("dmsuite={level},dmsitem={level}")
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set and valid, replaces [`Verbosity::directive`]. Calling
/// this more than once keeps the first subscriber.
///
/// ```no_run
/// use dmsuite::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_file(false)
            .with_line_number(false),
    );

    // Already installed.
    let _ = subscriber.try_init();
}

/// Route warnings raised in unit tests to the test output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
