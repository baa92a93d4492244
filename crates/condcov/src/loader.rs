//! Target loading
//!
//! Reads the code under test, instruments it, and executes it once in a fresh
//! scope that has the probe bound. The functions it defines become the
//! tracked functions test files are rerouted to.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::coverage::{probe, SharedLedger, SiteMap, PROBE_NAME};
use crate::instrument::Instrumenter;
use crate::interp::{Interpreter, Scope, Value};
use crate::lang::parse;
use crate::result::{CondcovError, CondcovResult};

/// An instrumented, executed target file
#[derive(Debug)]
pub struct LoadedTarget {
    /// Path the target was read from
    pub path: PathBuf,
    /// Module identifier test files import it by (the file stem)
    pub module_name: String,
    /// Conditional sites found while instrumenting
    pub sites: SiteMap,
    functions: Vec<(String, Value)>,
}

impl LoadedTarget {
    /// Tracked functions in definition order
    #[must_use]
    pub fn functions(&self) -> &[(String, Value)] {
        &self.functions
    }

    /// Names of the tracked functions
    pub fn tracked_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a tracked function
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Value> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// Loads targets with probes wired to one ledger
#[derive(Debug, Clone)]
pub struct TargetLoader {
    ledger: SharedLedger,
}

impl TargetLoader {
    /// Create a loader recording into `ledger`
    #[must_use]
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    /// Read, instrument and execute the target at `path`
    pub fn load(&self, path: &Path, interp: &mut Interpreter) -> CondcovResult<LoadedTarget> {
        let source = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => CondcovError::TargetNotFound {
                path: path.to_path_buf(),
            },
            _ => CondcovError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;
        self.load_source(&source, path, interp)
    }

    /// Instrument and execute already-read target source
    pub fn load_source(
        &self,
        source: &str,
        path: &Path,
        interp: &mut Interpreter,
    ) -> CondcovResult<LoadedTarget> {
        let file_id = path.display().to_string();
        let module =
            parse(source, &file_id).map_err(|err| CondcovError::target_load(path, err))?;
        let (module, sites) = Instrumenter::new(file_id.as_str()).instrument(module);

        let scope = Scope::new();
        scope.set(PROBE_NAME, probe(&self.ledger));
        interp
            .exec_module(&module, &scope)
            .map_err(|err| CondcovError::target_load(path, err))?;

        let functions: Vec<(String, Value)> = scope
            .entries()
            .into_iter()
            .filter(|(name, value)| name != PROBE_NAME && matches!(value, Value::Function(_)))
            .collect();

        tracing::info!(
            target_file = %file_id,
            sites = sites.len(),
            functions = functions.len(),
            "loaded target"
        );

        Ok(LoadedTarget {
            path: path.to_path_buf(),
            module_name: module_name(path),
            sites,
            functions,
        })
    }
}

/// Import name of a source file: its stem
#[must_use]
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
