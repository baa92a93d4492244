//! Test file execution
//!
//! Each test file runs in its own scope, seeded only with the target's
//! functions under their `imported_` aliases. Module-level execution defines
//! the units; they are then invoked one by one, in definition order.
//!
//! Failures split in two classes: anything that goes wrong before a unit
//! runs (missing file, syntax error, module-level raise, no units) skips the
//! file, while a unit that raises ends the whole run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::interp::{Interpreter, Scope, Value};
use crate::lang::Module;
use crate::loader::LoadedTarget;
use crate::result::{CondcovError, CondcovResult, LoadFailure};
use crate::rewrite::{alias_for, is_test_name, TestRewriter};

/// What running one test file did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Test file path
    pub path: PathBuf,
    /// Units invoked, in order
    pub units: Vec<String>,
    /// Units synthesized from assertions
    pub synthesized: usize,
}

/// Runs test files against one loaded target
#[derive(Debug, Clone, Copy)]
pub struct TestExecutor<'t> {
    target: &'t LoadedTarget,
}

impl<'t> TestExecutor<'t> {
    /// Create an executor for tests of `target`
    #[must_use]
    pub const fn new(target: &'t LoadedTarget) -> Self {
        Self { target }
    }

    /// Read, rewrite and run the test file at `path`
    pub fn run_file(&self, path: &Path, interp: &mut Interpreter) -> CondcovResult<FileOutcome> {
        let source = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => CondcovError::TestFileNotFound {
                path: path.to_path_buf(),
            },
            _ => CondcovError::test_file_load(path, LoadFailure::Read(err)),
        })?;
        self.run_source(&source, path, interp)
    }

    /// Rewrite and run already-read test source
    pub fn run_source(
        &self,
        source: &str,
        path: &Path,
        interp: &mut Interpreter,
    ) -> CondcovResult<FileOutcome> {
        let file_id = path.display().to_string();
        let module = crate::lang::parse(source, &file_id)
            .map_err(|err| CondcovError::test_file_load(path, err))?;
        let mut rewriter =
            TestRewriter::new(self.target.module_name.as_str(), self.target.tracked_names());
        let module = rewriter.rewrite(module);

        let units = self.define_units(&module, path, interp)?;
        tracing::info!(
            test_file = %file_id,
            units = units.len(),
            synthesized = rewriter.synthesized(),
            "running test file"
        );

        let mut names = Vec::with_capacity(units.len());
        for (name, unit) in units {
            tracing::debug!(unit = %name, "invoking test unit");
            interp
                .call(&unit, Vec::new(), Vec::new())
                .map_err(|exception| CondcovError::from_unit(path, &name, exception))?;
            names.push(name);
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            units: names,
            synthesized: rewriter.synthesized(),
        })
    }

    /// Execute the rewritten module and collect its test units
    fn define_units(
        &self,
        module: &Module,
        path: &Path,
        interp: &mut Interpreter,
    ) -> CondcovResult<Vec<(String, Value)>> {
        let scope = self.test_scope();
        interp
            .exec_module(module, &scope)
            .map_err(|err| CondcovError::test_file_load(path, err))?;

        let units: Vec<(String, Value)> = scope
            .entries()
            .into_iter()
            .filter(|(name, value)| is_test_name(name) && matches!(value, Value::Function(_)))
            .collect();
        if units.is_empty() {
            return Err(CondcovError::NoTestUnits {
                path: path.to_path_buf(),
            });
        }
        Ok(units)
    }

    fn test_scope(&self) -> Scope {
        let scope = Scope::new();
        for (name, function) in self.target.functions() {
            scope.set(alias_for(name), function.clone());
        }
        scope
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::coverage::{CoverageLedger, SharedLedger, SiteId};
    use crate::loader::TargetLoader;

    const TARGET: &str = concat!(
        "def calculate_discount(age, loyalty_status, first_order):\n",
        "    if age > 65 and first_order:\n",
        "        return 0.5\n",
        "    elif not first_order and (loyalty_status == 'gold' or age > 55):\n",
        "        return 0.3\n",
        "    elif loyalty_status == 'client_kid':\n",
        "        return 0.2\n",
        "    else:\n",
        "        return 0.0\n",
    );

    fn target() -> (SharedLedger, LoadedTarget) {
        let ledger = CoverageLedger::shared();
        let target = TargetLoader::new(ledger.clone())
            .load_source(TARGET, Path::new("sample_code.py"), &mut Interpreter::new())
            .unwrap();
        (ledger, target)
    }

    fn run(target: &LoadedTarget, source: &str) -> CondcovResult<FileOutcome> {
        TestExecutor::new(target).run_source(source, Path::new("test_file.py"), &mut Interpreter::new())
    }

    #[test]
    fn test_single_assertion_records_reached_sites() {
        let (ledger, target) = target();
        let outcome = run(
            &target,
            "from sample_code import calculate_discount\nassert calculate_discount(66, 'basic', True) == 0.5\n",
        )
        .unwrap();
        assert_eq!(outcome.units, vec!["test_assert_1"]);
        assert_eq!(outcome.synthesized, 1);
        let ledger = ledger.borrow();
        assert!(ledger.contains(&SiteId::new("sample_code.py", 2), &[true, true]));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_units_run_in_definition_order() {
        let (ledger, target) = target();
        let outcome = run(
            &target,
            concat!(
                "from sample_code import calculate_discount\n",
                "def test_first():\n",
                "    assert calculate_discount(66, 'basic', True) == 0.5\n",
                "def test_second():\n",
                "    result = calculate_discount(20, 'basic', False)\n",
                "    assert result == 0.0\n",
            ),
        )
        .unwrap();
        assert_eq!(outcome.units, vec!["test_assert_1", "test_first", "test_second"]);
        let site = SiteId::new("sample_code.py", 2);
        assert_eq!(ledger.borrow().observed(&site), 2);
    }

    #[test]
    fn test_no_units_is_a_warning() {
        let (_, target) = target();
        let err = run(&target, "def helper():\n    return 1\n").unwrap_err();
        assert!(matches!(err, CondcovError::NoTestUnits { .. }));
        assert!(err.is_warning());
    }

    #[test]
    fn test_module_level_failure_is_recoverable() {
        let (_, target) = target();
        let err = run(&target, "x = undefined_name\ndef test_x():\n    pass\n").unwrap_err();
        assert!(matches!(
            err,
            CondcovError::TestFileLoad {
                source: LoadFailure::Runtime(_),
                ..
            }
        ));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_failing_assertion_is_fatal() {
        let (_, target) = target();
        let err = run(
            &target,
            "from sample_code import calculate_discount\nassert calculate_discount(66, 'basic', True) == 0.1\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CondcovError::AssertionFailure { ref unit, line: 2, .. } if unit == "test_assert_1"
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_raising_unit_is_fatal() {
        let (_, target) = target();
        let err = run(&target, "def test_boom():\n    return 1 // 0\n").unwrap_err();
        assert!(matches!(err, CondcovError::TestExecution { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_file_is_recoverable() {
        let (_, target) = target();
        let err = TestExecutor::new(&target)
            .run_file(Path::new("/nonexistent/condcov/test_x.py"), &mut Interpreter::new())
            .unwrap_err();
        assert!(matches!(err, CondcovError::TestFileNotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_target_names_are_not_visible_unaliased() {
        let (_, target) = target();
        let err = run(&target, "x = calculate_discount\ndef test_x():\n    pass\n").unwrap_err();
        assert!(err.is_recoverable());
    }
}
