//! CLI configuration

use condcov::interp::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Report width used when the terminal size is unknown
pub const FALLBACK_WIDTH: usize = 80;

/// Narrowest width banners are laid out for
pub const MIN_WIDTH: usize = 40;

/// Highest call depth limit `--max-depth` accepts
pub const MAX_DEPTH_LIMIT: usize = 10_000;

/// Stack reserved for the session thread before any calls nest
const BASE_STACK: usize = 8 * 1024 * 1024;

/// Stack reserved per nested interpreted call
const STACK_PER_CALL: usize = 128 * 1024;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - report and errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - progress logging
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default log filter directive when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "condcov=info",
            Self::Debug => "condcov=debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Report format
    pub format: OutputFormat,
    /// Report width; `None` follows the terminal
    pub width: Option<usize>,
    /// Interpreter call depth limit
    pub max_depth: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            format: OutputFormat::Text,
            width: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set report format
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Fix the report width
    #[must_use]
    pub const fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width;
        self
    }

    /// Set the call depth limit
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Stack size for the thread running the session at `max_depth`
    #[must_use]
    pub const fn session_stack_size(&self) -> usize {
        BASE_STACK.saturating_add(self.max_depth.saturating_mul(STACK_PER_CALL))
    }

    /// Width reports are laid out for
    #[must_use]
    pub fn effective_width(&self) -> usize {
        self.width
            .or_else(|| {
                console::Term::stdout()
                    .size_checked()
                    .map(|(_, cols)| usize::from(cols))
            })
            .unwrap_or(FALLBACK_WIDTH)
            .max(MIN_WIDTH)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_default_verbosity() {
            assert_eq!(Verbosity::default(), Verbosity::Normal);
        }

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 2), Verbosity::Debug);
        }

        #[test]
        fn test_is_quiet() {
            assert!(Verbosity::Quiet.is_quiet());
            assert!(!Verbosity::Normal.is_quiet());
            assert!(!Verbosity::Debug.is_quiet());
        }

        #[test]
        fn test_log_filter() {
            assert_eq!(Verbosity::Quiet.log_filter(), "error");
            assert_eq!(Verbosity::Debug.log_filter(), "condcov=debug");
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
            assert_eq!(ColorChoice::default(), ColorChoice::Auto);
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let config = CliConfig::new()
                .with_verbosity(Verbosity::Debug)
                .with_color(ColorChoice::Never)
                .with_format(OutputFormat::Json)
                .with_width(Some(100))
                .with_max_depth(50);
            assert_eq!(config.verbosity, Verbosity::Debug);
            assert_eq!(config.color, ColorChoice::Never);
            assert_eq!(config.format, OutputFormat::Json);
            assert_eq!(config.effective_width(), 100);
            assert_eq!(config.max_depth, 50);
        }

        #[test]
        fn test_session_stack_grows_with_depth() {
            let shallow = CliConfig::new().with_max_depth(10).session_stack_size();
            let deep = CliConfig::new().with_max_depth(MAX_DEPTH_LIMIT).session_stack_size();
            assert!(shallow >= BASE_STACK);
            assert_eq!(deep - shallow, (MAX_DEPTH_LIMIT - 10) * STACK_PER_CALL);
            let unbounded = CliConfig::new().with_max_depth(usize::MAX).session_stack_size();
            assert_eq!(unbounded, usize::MAX);
        }

        #[test]
        fn test_width_has_a_floor() {
            let config = CliConfig::new().with_width(Some(10));
            assert_eq!(config.effective_width(), MIN_WIDTH);
        }

        #[test]
        fn test_serialization_roundtrip() {
            let config = CliConfig::new().with_width(Some(90));
            let json = serde_json::to_string(&config).unwrap();
            let back: CliConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(back.width, Some(90));
            assert_eq!(back.format, OutputFormat::Text);
        }
    }
}
