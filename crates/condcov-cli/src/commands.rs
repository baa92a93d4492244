//! CLI command definitions using clap

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use condcov::interp::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;

use crate::config::{CliConfig, ColorChoice, Verbosity, MAX_DEPTH_LIMIT};
use crate::output::OutputFormat;

/// condcov: condition-level branch coverage for a code file and its tests
#[derive(Parser, Debug)]
#[command(name = "condcov")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Code file whose conditionals are measured
    pub target: PathBuf,

    /// Test files exercising the code file
    #[arg(required = true, num_args = 1..)]
    pub tests: Vec<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (report and errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorArg,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Report width in columns (defaults to the terminal width)
    #[arg(long)]
    pub width: Option<usize>,

    /// Maximum call depth inside the target and tests
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_DEPTH_LIMIT as u64)
    )]
    pub max_depth: usize,
}

impl Cli {
    /// Build the run configuration from parsed arguments
    #[must_use]
    pub fn config(&self) -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::from_flags(self.quiet, self.verbose))
            .with_color(self.color.into())
            .with_format(self.format.into())
            .with_width(self.width)
            .with_max_depth(self.max_depth)
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Detect from terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document on stdout
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
