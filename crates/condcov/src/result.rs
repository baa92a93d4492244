//! Result and error types for condcov.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::interp::Exception;
use crate::lang::SyntaxError;

/// Result type for condcov operations
pub type CondcovResult<T> = Result<T, CondcovError>;

/// Why a file could not be loaded
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// Reading the file failed for a reason other than absence
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    /// The source does not parse
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Module-level execution raised
    #[error(transparent)]
    Runtime(#[from] Exception),
}

/// Errors that can occur during a coverage run
#[derive(Debug, Error)]
pub enum CondcovError {
    /// Target file does not exist
    #[error("Provided file not found: {}", .path.display())]
    TargetNotFound {
        /// Target path
        path: PathBuf,
    },

    /// Target failed to parse or execute
    #[error("Loading {} failed: {source}", .path.display())]
    TargetLoad {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        source: LoadFailure,
    },

    /// A test file does not exist
    #[error("Provided file {} cannot be found", .path.display())]
    TestFileNotFound {
        /// Test file path
        path: PathBuf,
    },

    /// A test file failed to read, parse or execute at module level
    #[error("Execution of {} failed: {source}", .path.display())]
    TestFileLoad {
        /// Test file path
        path: PathBuf,
        /// Underlying cause
        source: LoadFailure,
    },

    /// A test file defines no test units
    #[error("No test functions found in {}", .path.display())]
    NoTestUnits {
        /// Test file path
        path: PathBuf,
    },

    /// A test unit's assertion failed
    #[error("Assertion error in {} ({unit}, line {line}){}", .path.display(), detail(.message))]
    AssertionFailure {
        /// Test file path
        path: PathBuf,
        /// Failing unit
        unit: String,
        /// Line of the failing `assert`
        line: usize,
        /// Assertion message, if any
        message: Option<String>,
    },

    /// A test unit raised something other than an assertion failure
    #[error("Test {unit} in {} failed: {source}", .path.display())]
    TestExecution {
        /// Test file path
        path: PathBuf,
        /// Failing unit
        unit: String,
        /// Raised exception
        source: Exception,
    },

    /// I/O error outside file loading
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

fn detail(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl CondcovError {
    /// Create a test-file load error
    #[must_use]
    pub fn test_file_load(path: impl Into<PathBuf>, source: impl Into<LoadFailure>) -> Self {
        Self::TestFileLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a target load error
    #[must_use]
    pub fn target_load(path: impl Into<PathBuf>, source: impl Into<LoadFailure>) -> Self {
        Self::TargetLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Classify a failure raised while invoking a test unit
    #[must_use]
    pub fn from_unit(path: &Path, unit: &str, exception: Exception) -> Self {
        match exception {
            Exception::Assertion { message, line } => Self::AssertionFailure {
                path: path.to_path_buf(),
                unit: unit.to_string(),
                line,
                message,
            },
            other => Self::TestExecution {
                path: path.to_path_buf(),
                unit: unit.to_string(),
                source: other,
            },
        }
    }

    /// Whether the run can continue with the next test file
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TestFileNotFound { .. } | Self::TestFileLoad { .. } | Self::NoTestUnits { .. }
        )
    }

    /// Whether this is a missing-units warning rather than an error
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::NoTestUnits { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let missing = CondcovError::TestFileNotFound {
            path: "t.py".into(),
        };
        let no_units = CondcovError::NoTestUnits {
            path: "t.py".into(),
        };
        let target = CondcovError::TargetNotFound {
            path: "c.py".into(),
        };
        assert!(missing.is_recoverable());
        assert!(no_units.is_recoverable());
        assert!(no_units.is_warning());
        assert!(!target.is_recoverable());
    }

    #[test]
    fn test_unit_failures_are_fatal() {
        let assertion = CondcovError::from_unit(
            Path::new("t.py"),
            "test_assert_1",
            Exception::Assertion {
                message: None,
                line: 4,
            },
        );
        assert!(matches!(assertion, CondcovError::AssertionFailure { line: 4, .. }));
        assert!(!assertion.is_recoverable());
        assert_eq!(
            assertion.to_string(),
            "Assertion error in t.py (test_assert_1, line 4)"
        );

        let other = CondcovError::from_unit(
            Path::new("t.py"),
            "test_x",
            Exception::Name("y".into()),
        );
        assert!(!other.is_recoverable());
        assert_eq!(
            other.to_string(),
            "Test test_x in t.py failed: NameError: name 'y' is not defined"
        );
    }

    #[test]
    fn test_load_failure_display_is_transparent() {
        let err = CondcovError::test_file_load(
            "t.py",
            SyntaxError::new("t.py", 3, "expected ':'"),
        );
        assert_eq!(
            err.to_string(),
            "Execution of t.py failed: t.py:3: syntax error: expected ':'"
        );
    }
}
