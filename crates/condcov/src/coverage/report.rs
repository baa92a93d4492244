//! Coverage report generation
//!
//! Joins the site map with the ledger:
//! - per-site required / observed counts and local score
//! - missing truth-tuples, enumerated lazily
//! - aggregate totals and overall score

use serde::Serialize;
use std::collections::BTreeSet;

use super::ledger::CoverageLedger;
use super::site::{ConditionalSite, SiteId, SiteMap};

/// Maximum items shown in condition and missing-combination previews
pub const PREVIEW_LIMIT: usize = 5;

/// Marker appended to a truncated preview
pub const ELLIPSIS: &str = "...";

/// Number of truth-tuples for `arity` conditions, saturating at `u64::MAX`
#[must_use]
pub fn required_combinations(arity: usize) -> u64 {
    u32::try_from(arity)
        .ok()
        .and_then(|shift| 1u64.checked_shl(shift))
        .unwrap_or(u64::MAX)
}

fn percent(observed: u64, required: u64) -> f64 {
    if required == 0 {
        100.0
    } else {
        observed as f64 / required as f64 * 100.0
    }
}

/// Render one truth-tuple as `True for a, False for b`
///
/// At most [`PREVIEW_LIMIT`] pairs are rendered; longer tuples end in ` ...`.
#[must_use]
pub fn describe_combination(conditions: &[String], values: &[bool]) -> String {
    let details: Vec<String> = values
        .iter()
        .zip(conditions)
        .take(PREVIEW_LIMIT)
        .map(|(value, condition)| {
            format!("{} for {condition}", if *value { "True" } else { "False" })
        })
        .collect();
    let mut line = details.join(", ");
    if conditions.len() > PREVIEW_LIMIT {
        line.push(' ');
        line.push_str(ELLIPSIS);
    }
    line
}

/// Coverage of one conditional site
#[derive(Debug, Clone, Serialize)]
pub struct SiteCoverage {
    /// Site identity
    #[serde(flatten)]
    pub id: SiteId,
    /// Atomic condition texts
    pub conditions: Vec<String>,
    /// `2^n` for `n` conditions
    pub required: u64,
    /// Distinct tuples seen
    pub observed: u64,
    /// `observed / required` as a percentage
    pub score: f64,
    /// `required - observed`
    pub missing_count: u64,
    /// First missing combinations, rendered
    pub missing_preview: Vec<String>,
    #[serde(skip)]
    seen: BTreeSet<Vec<bool>>,
}

impl SiteCoverage {
    /// Compute coverage for `site` from what `ledger` recorded
    #[must_use]
    pub fn new(site: &ConditionalSite, ledger: &CoverageLedger) -> Self {
        let arity = site.arity();
        let seen: BTreeSet<Vec<bool>> = ledger
            .tuples(&site.id)
            .map(|tuples| {
                tuples
                    .iter()
                    .filter(|t| t.len() == arity)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let required = required_combinations(arity);
        let observed = seen.len() as u64;
        let mut coverage = Self {
            id: site.id.clone(),
            conditions: site.conditions.clone(),
            required,
            observed,
            score: percent(observed, required),
            missing_count: required.saturating_sub(observed),
            missing_preview: Vec::new(),
            seen,
        };
        coverage.missing_preview = coverage.render_missing_preview();
        coverage
    }

    /// Whether every combination was observed
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.missing_count == 0
    }

    /// Observed tuples
    #[must_use]
    pub const fn seen(&self) -> &BTreeSet<Vec<bool>> {
        &self.seen
    }

    /// Unobserved tuples, `True` before `False`, leftmost condition varying slowest
    pub fn missing(&self) -> MissingCombinations<'_> {
        MissingCombinations {
            seen: &self.seen,
            next: Some(vec![true; self.conditions.len()]),
        }
    }

    /// Condition texts capped at [`PREVIEW_LIMIT`], with [`ELLIPSIS`] when cut
    #[must_use]
    pub fn conditions_preview(&self) -> String {
        let shown = &self.conditions[..self.conditions.len().min(PREVIEW_LIMIT)];
        let mut line = shown.join(", ");
        if self.conditions.len() > PREVIEW_LIMIT {
            line.push(' ');
            line.push_str(ELLIPSIS);
        }
        line
    }

    fn render_missing_preview(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .missing()
            .take(PREVIEW_LIMIT)
            .map(|values| describe_combination(&self.conditions, &values))
            .collect();
        if self.missing_count > PREVIEW_LIMIT as u64 {
            lines.push(ELLIPSIS.to_string());
        }
        lines
    }
}

/// Lazy enumeration of the truth-tuples a site has not produced yet
#[derive(Debug, Clone)]
pub struct MissingCombinations<'a> {
    seen: &'a BTreeSet<Vec<bool>>,
    next: Option<Vec<bool>>,
}

impl Iterator for MissingCombinations<'_> {
    type Item = Vec<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next.take()?;
            self.next = successor(&current);
            if !self.seen.contains(&current) {
                return Some(current);
            }
        }
    }
}

/// Next tuple in True-before-False order, `None` after all-False
fn successor(values: &[bool]) -> Option<Vec<bool>> {
    let mut next = values.to_vec();
    for slot in next.iter_mut().rev() {
        if *slot {
            *slot = false;
            return Some(next);
        }
        *slot = true;
    }
    None
}

/// Coverage of every site plus totals
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    /// Per-site entries in (file, line) order
    pub sites: Vec<SiteCoverage>,
    /// Sum of `required` over all sites
    pub total_required: u64,
    /// Sum of `observed` over all sites
    pub total_observed: u64,
    /// Aggregate score; 100 when there are no sites
    pub score: f64,
}

impl CoverageReport {
    /// Build the report for `sites` from `ledger`
    #[must_use]
    pub fn build(sites: &SiteMap, ledger: &CoverageLedger) -> Self {
        let sites: Vec<SiteCoverage> = sites
            .values()
            .map(|site| SiteCoverage::new(site, ledger))
            .collect();
        let total_required = sites
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.required));
        let total_observed: u64 = sites.iter().map(|s| s.observed).sum();
        Self {
            score: percent(total_observed, total_required),
            sites,
            total_required,
            total_observed,
        }
    }

    /// Look up one site
    #[must_use]
    pub fn site(&self, file: &str, line: usize) -> Option<&SiteCoverage> {
        self.sites
            .iter()
            .find(|s| s.id.file == file && s.id.line == line)
    }

    /// Whether every combination of every site was observed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sites.iter().all(SiteCoverage::is_complete)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
