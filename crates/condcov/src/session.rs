//! One coverage run
//!
//! ```text
//! target ──► TargetLoader ──► LoadedTarget ─┐
//!                                            ├─► TestExecutor (per file) ──► ledger
//! tests ──► dedup (first-seen order) ───────┘
//!
//! SiteMap + ledger ──► CoverageReport
//! ```

use std::path::{Path, PathBuf};

use crate::coverage::{CoverageLedger, CoverageReport, SharedLedger};
use crate::executor::{FileOutcome, TestExecutor};
use crate::interp::{Interpreter, DEFAULT_MAX_DEPTH};
use crate::loader::TargetLoader;
use crate::result::{CondcovError, CondcovResult};

/// Result of a run that reached the report
#[derive(Debug)]
pub struct SessionReport {
    /// Coverage of the target
    pub report: CoverageReport,
    /// Files whose units all ran
    pub completed: Vec<FileOutcome>,
    /// Files skipped on a recoverable error
    pub skipped: Vec<PathBuf>,
}

/// Configured coverage run over one target and its test files
#[derive(Debug, Clone)]
pub struct Session {
    target: PathBuf,
    tests: Vec<PathBuf>,
    max_depth: usize,
}

impl Session {
    /// Create a session for `target` with no test files yet
    #[must_use]
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            tests: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Add a test file; repeats are ignored
    #[must_use]
    pub fn with_test_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.tests.contains(&path) {
            self.tests.push(path);
        }
        self
    }

    /// Add several test files, keeping first-seen order
    #[must_use]
    pub fn with_test_files<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().fold(self, Self::with_test_file)
    }

    /// Set the interpreter call depth limit
    ///
    /// Every level needs native stack; limits far above the default belong
    /// on a thread spawned with a matching stack size.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Target path
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// De-duplicated test files
    #[must_use]
    pub fn test_files(&self) -> &[PathBuf] {
        &self.tests
    }

    /// Run every test file and build the report
    ///
    /// Recoverable per-file errors go to `on_diagnostic` and the run moves
    /// on. Target failures and failing units end the run with `Err`.
    pub fn run<F>(&self, mut on_diagnostic: F) -> CondcovResult<SessionReport>
    where
        F: FnMut(&CondcovError),
    {
        let ledger: SharedLedger = CoverageLedger::shared();
        let mut interp = Interpreter::new().with_max_depth(self.max_depth);
        let target = TargetLoader::new(ledger.clone()).load(&self.target, &mut interp)?;
        let executor = TestExecutor::new(&target);

        let mut completed = Vec::with_capacity(self.tests.len());
        let mut skipped = Vec::new();
        for path in &self.tests {
            match executor.run_file(path, &mut interp) {
                Ok(outcome) => completed.push(outcome),
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(test_file = %path.display(), error = %err, "skipping test file");
                    on_diagnostic(&err);
                    skipped.push(path.clone());
                }
                Err(err) => {
                    tracing::error!(test_file = %path.display(), error = %err, "test run aborted");
                    return Err(err);
                }
            }
        }

        let report = CoverageReport::build(&target.sites, &ledger.borrow());
        tracing::info!(
            sites = report.sites.len(),
            observed = report.total_observed,
            required = report.total_required,
            "coverage collected"
        );
        Ok(SessionReport {
            report,
            completed,
            skipped,
        })
    }
}
