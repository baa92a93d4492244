//! condcov: condition-level branch coverage
//!
//! Measures, for every `if` / `elif` in a target file, which combinations of
//! truth values its atomic conditions took while a test suite ran, and
//! reports the combinations never observed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CONDCOV Pipeline                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   target.py ──► lang::parse ──► Instrumenter ──► TargetLoader    │
//! │                                   │ SiteMap         │ functions  │
//! │                                   ▼                 ▼            │
//! │   test_*.py ──► TestRewriter ──► TestExecutor ──► probe calls    │
//! │                                                     │            │
//! │                                                     ▼            │
//! │                      CoverageReport ◄──── CoverageLedger         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use condcov::Session;
//!
//! let outcome = Session::new("sample_code.py")
//!     .with_test_files(["test_file.py"])
//!     .run(|err| eprintln!("{err}"))?;
//! println!("Overall score: {:.2}%", outcome.report.score);
//! # Ok::<(), condcov::CondcovError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Condition coverage: sites, ledger and report model
pub mod coverage;

/// Probe insertion into parsed modules
pub mod instrument;

/// Tree-walking interpreter the target and tests run in
pub mod interp;

/// Lexer, parser, unparser and visitors for the instrumented language
#[allow(missing_docs)]
pub mod lang;

mod executor;
mod loader;
mod result;
mod rewrite;
mod session;

pub use coverage::{
    ConditionalSite, CoverageLedger, CoverageReport, SharedLedger, SiteCoverage, SiteId, SiteMap,
};
pub use executor::{FileOutcome, TestExecutor};
pub use instrument::{decompose, instrument, Instrumenter};
pub use interp::{Exception, Interpreter, Scope, Value};
pub use lang::{parse, Module, SyntaxError};
pub use loader::{module_name, LoadedTarget, TargetLoader};
pub use result::{CondcovError, CondcovResult, LoadFailure};
pub use rewrite::{
    alias_for, is_test_name, rewrite, TestRewriter, ALIAS_PREFIX, ASSERT_UNIT_PREFIX, TEST_PREFIX,
};
pub use session::{Session, SessionReport};
