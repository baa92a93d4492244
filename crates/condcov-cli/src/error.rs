//! Error types for the CLI

use condcov::CondcovError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Coverage run failed fatally
    #[error("{0}")]
    Coverage(#[from] CondcovError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed
    #[error("Report generation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error("Logging setup failed: {message}")]
    Logging {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a logging error
    #[must_use]
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    /// Process exit status for this error
    ///
    /// Every failure that reaches `main` exits with 1; usage errors never get
    /// here because clap exits on its own.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Coverage(_) | Self::Io(_) | Self::Serialization(_) | Self::Logging { .. } => 1,
        }
    }

    /// Whether the failure came from the coverage run itself
    #[must_use]
    pub const fn is_coverage(&self) -> bool {
        matches!(self, Self::Coverage(_))
    }
}
