//! Conditional site identity and the site map

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a conditional construct: source file and line
///
/// Orders by file, then line, so site maps iterate in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SiteId {
    /// Source file identifier
    pub file: String,
    /// 1-based line of the `if` / `elif`
    pub line: usize,
}

impl SiteId {
    /// Create a site id
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One decomposed conditional construct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalSite {
    /// Where the construct is
    pub id: SiteId,
    /// Source text of each atomic condition, left to right
    pub conditions: Vec<String>,
}

impl ConditionalSite {
    /// Create a site; `conditions` must be non-empty
    #[must_use]
    pub fn new(id: SiteId, conditions: Vec<String>) -> Self {
        debug_assert!(!conditions.is_empty(), "site without conditions");
        Self { id, conditions }
    }

    /// Number of atomic conditions
    #[must_use]
    pub fn arity(&self) -> usize {
        self.conditions.len()
    }
}

/// Every site registered while instrumenting, in (file, line) order
pub type SiteMap = BTreeMap<SiteId, ConditionalSite>;
