//! Observed truth-tuples per conditional site

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use super::site::SiteId;
use crate::interp::{Exception, Value};

/// Name the instrumenter binds the probe under in the target scope
pub const PROBE_NAME: &str = "__branch_probe__";

/// Ledger handle shared between the probe closure and the reporter
pub type SharedLedger = Rc<RefCell<CoverageLedger>>;

/// Set of distinct truth-tuples observed at each site
///
/// Only grows: there is no per-site removal, only [`clear`](Self::clear) to
/// reset between independent runs.
#[derive(Debug, Default, Clone)]
pub struct CoverageLedger {
    tuples: HashMap<SiteId, BTreeSet<Vec<bool>>>,
    records: u64,
}

impl CoverageLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger behind a shared handle
    #[must_use]
    pub fn shared() -> SharedLedger {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Record one evaluation of a site's atomic conditions
    ///
    /// Returns `false` and records nothing when the tuple length differs from
    /// tuples already stored for the site.
    pub fn record(&mut self, site: SiteId, values: Vec<bool>) -> bool {
        let seen = self.tuples.entry(site).or_default();
        if let Some(width) = seen.first().map(Vec::len) {
            if width != values.len() {
                tracing::warn!(
                    expected = width,
                    got = values.len(),
                    "ignoring truth-tuple of inconsistent length"
                );
                return false;
            }
        }
        self.records += 1;
        seen.insert(values);
        true
    }

    /// Distinct tuples seen at `site`
    #[must_use]
    pub fn tuples(&self, site: &SiteId) -> Option<&BTreeSet<Vec<bool>>> {
        self.tuples.get(site)
    }

    /// Number of distinct tuples seen at `site`; 0 if never reached
    #[must_use]
    pub fn observed(&self, site: &SiteId) -> usize {
        self.tuples.get(site).map_or(0, BTreeSet::len)
    }

    /// Whether `values` has been seen at `site`
    #[must_use]
    pub fn contains(&self, site: &SiteId, values: &[bool]) -> bool {
        self.tuples.get(site).is_some_and(|set| set.contains(values))
    }

    /// Total probe invocations accepted, duplicates included
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Number of sites reached at least once
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// True when no site has been reached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.tuples.clear();
        self.records = 0;
    }
}

/// Build the probe callable bound into instrumented code
///
/// Called as `__branch_probe__(file, line, *conditions)`; every condition is
/// reduced to its truth value.
#[must_use]
pub fn probe(ledger: &SharedLedger) -> Value {
    let ledger = Rc::clone(ledger);
    Value::native(PROBE_NAME, move |args| {
        let [file, line, conditions @ ..] = args else {
            return Err(Exception::type_error(format!(
                "{PROBE_NAME}() requires a file and a line"
            )));
        };
        let (Value::Str(file), Some(line)) = (file, line.as_index()) else {
            return Err(Exception::type_error(format!(
                "{PROBE_NAME}() expects (str, int, ...)"
            )));
        };
        let line = usize::try_from(line)
            .map_err(|_| Exception::value_error(format!("invalid line {line}")))?;
        let values = conditions.iter().map(Value::is_truthy).collect();
        ledger
            .borrow_mut()
            .record(SiteId::new(file.to_string(), line), values);
        Ok(Value::None)
    })
}
