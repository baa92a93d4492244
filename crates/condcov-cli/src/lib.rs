//! condcov CLI Library
//!
//! Command-line front end for the condcov coverage engine: argument
//! parsing, configuration, logging setup and console reporting.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, FormatArg};
pub use config::{CliConfig, ColorChoice, Verbosity, FALLBACK_WIDTH, MIN_WIDTH};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::{banner, diagnostic_lines, separator, OutputFormat, ReportRenderer, Reporter};
pub use runner::CoverageRunner;
