//! Diagnostic logging setup
//!
//! Library events go through `tracing`; the CLI installs one `fmt`
//! subscriber on stderr so they never mix with the report on stdout.
//! `RUST_LOG` overrides the level picked from `-v` / `-q`.

use tracing_subscriber::EnvFilter;

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};

/// Filter for `verbosity`, unless `RUST_LOG` is set
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber
pub fn init_logging(verbosity: Verbosity, use_color: bool) -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::logging(err.to_string()))
}
