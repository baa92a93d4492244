//! Condition coverage tracking
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  instrumented target                                          │
//! │     __branch_probe__(file, line, c1, c2, ...)                 │
//! │                 │                                             │
//! │                 ▼                                             │
//! │  CoverageLedger  (SiteId → set of truth-tuples)               │
//! │                 │                                             │
//! │   SiteMap ──────┼──► CoverageReport (per site + aggregate)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger is owned by the session and reaches the probe through a shared
//! handle, so independent runs never see each other's tuples.

mod ledger;
mod report;
mod site;

pub use ledger::{probe, CoverageLedger, SharedLedger, PROBE_NAME};
pub use report::{
    describe_combination, required_combinations, CoverageReport, MissingCombinations,
    SiteCoverage, ELLIPSIS, PREVIEW_LIMIT,
};
pub use site::{ConditionalSite, SiteId, SiteMap};

#[cfg(test)]
mod tests;
