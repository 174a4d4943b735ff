//! Log output for the CLI.
//!
//! All diagnostics go to stderr through `tracing`, leaving stdout free for
//! merged text and reports.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the log filter (`RUST_LOG` syntax).
pub const LOG_ENV: &str = "MDMERGE_LOG";

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (_, true) => Verbosity::Verbose,
            (true, false) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn default_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Install the global subscriber. `MDMERGE_LOG`, then `RUST_LOG`, override
/// the level implied by `verbosity`.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
        assert_eq!(Verbosity::Quiet.default_filter(), "warn");
        assert_eq!(Verbosity::Verbose.default_filter(), "debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Normal);
    }
}
