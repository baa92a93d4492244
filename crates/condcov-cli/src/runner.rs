//! Coverage run driver

use condcov::{CoverageReport, Session, SessionReport};
use std::path::{Path, PathBuf};
use std::thread;

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{OutputFormat, Reporter};

/// Runs one coverage session and prints its output
#[derive(Debug)]
pub struct CoverageRunner {
    config: CliConfig,
    reporter: Reporter,
}

impl CoverageRunner {
    /// Create a runner for `config`
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = Reporter::new(
            config.effective_width(),
            config.color.should_color(),
            config.verbosity.is_quiet() || config.format == OutputFormat::Json,
        );
        Self { config, reporter }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Reporter in use
    #[must_use]
    pub const fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Measure `target` against `tests` and print the report
    pub fn run(&self, target: &Path, tests: &[PathBuf]) -> CliResult<CoverageReport> {
        let session = Session::new(target)
            .with_test_files(tests.iter().cloned())
            .with_max_depth(self.config.max_depth);

        self.reporter
            .session_header(session.target(), session.test_files())?;

        // Deep interpreted recursion needs more stack than the main thread has.
        let reporter = &self.reporter;
        let outcome = thread::scope(|scope| -> CliResult<SessionReport> {
            let worker = thread::Builder::new()
                .name("condcov-session".into())
                .stack_size(self.config.session_stack_size())
                .spawn_scoped(scope, move || session.run(|err| reporter.diagnostic(err)))?;
            let outcome = worker
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))?;
            Ok(outcome)
        })?;
        tracing::debug!(
            completed = outcome.completed.len(),
            skipped = outcome.skipped.len(),
            "session finished"
        );

        match self.config.format {
            OutputFormat::Text => self.reporter.report(&outcome.report)?,
            OutputFormat::Json => self.reporter.json(&outcome.report.to_json()?)?,
        }
        Ok(outcome.report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity, MAX_DEPTH_LIMIT};
    use crate::error::CliError;
    use condcov::CondcovError;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_config() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
            .with_width(Some(60))
    }

    #[test]
    fn test_run_returns_report() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("code.py");
        let tests = dir.path().join("test_code.py");
        fs::write(&target, "def f(a):\n    if a:\n        return 1\n    return 0\n").unwrap();
        fs::write(&tests, "from code import f\nassert f(1) == 1\nassert f(0) == 0\n").unwrap();

        let report = CoverageRunner::new(quiet_config()).run(&target, &[tests]).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.total_required, 2);
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = CoverageRunner::new(quiet_config())
            .run(&dir.path().join("missing.py"), &[dir.path().join("t.py")])
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Coverage(CondcovError::TargetNotFound { .. })
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_deep_recursion_within_limit_completes() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("deep.py");
        let tests = dir.path().join("test_deep.py");
        fs::write(
            &target,
            "def down(n):\n    if n == 0:\n        return 0\n    return down(n - 1)\n",
        )
        .unwrap();
        fs::write(&tests, "from deep import down\nassert down(4000) == 0\n").unwrap();

        let config = quiet_config().with_max_depth(MAX_DEPTH_LIMIT);
        let report = CoverageRunner::new(config).run(&target, &[tests]).unwrap();
        assert!(report.is_complete());
    }

    #[test]
    fn test_recursion_past_limit_is_an_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("endless.py");
        let tests = dir.path().join("test_endless.py");
        fs::write(&target, "def spin(n):\n    return spin(n + 1)\n").unwrap();
        fs::write(&tests, "from endless import spin\nassert spin(0) == 0\n").unwrap();

        let config = quiet_config().with_max_depth(3000);
        let err = CoverageRunner::new(config).run(&target, &[tests]).unwrap_err();
        assert!(err.to_string().contains("RecursionError"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_json_mode_suppresses_header() {
        let runner = CoverageRunner::new(quiet_config().with_verbosity(Verbosity::Normal).with_format(OutputFormat::Json));
        assert!(runner.reporter().quiet);
        assert_eq!(runner.config().format, OutputFormat::Json);
    }
}
