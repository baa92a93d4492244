//! Probe insertion

use super::decompose::decompose;
use crate::coverage::{ConditionalSite, SiteId, SiteMap, PROBE_NAME};
use crate::lang::visit::{walk_block_mut, VisitMut};
use crate::lang::{parse, Expr, Module, Stmt, StmtKind, SyntaxError};

/// Rewrites a module so every `if` / `elif` reports its atomic conditions
///
/// For a conditional at line `n` with atoms `c1 .. ck`, the statement
///
/// ```text
/// __branch_probe__('<file>', n, c1, ..., ck)
/// ```
///
/// is inserted immediately before it in the same block. The atoms are
/// copies of the original sub-expressions, so they are evaluated once by the
/// probe (all of them) and again by the untouched conditional.
#[derive(Debug)]
pub struct Instrumenter {
    file: String,
    sites: SiteMap,
}

impl Instrumenter {
    /// Create an instrumenter labelling sites with `file`
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            sites: SiteMap::new(),
        }
    }

    /// Instrument `module`, returning the rewritten tree and its sites
    #[must_use]
    pub fn instrument(mut self, mut module: Module) -> (Module, SiteMap) {
        self.visit_block_mut(&mut module.body);
        tracing::debug!(
            file = %self.file,
            sites = self.sites.len(),
            "instrumented module"
        );
        (module, self.sites)
    }

    fn probe_for(&mut self, line: usize, test: &Expr) -> Option<Stmt> {
        let atoms = decompose(test);
        if atoms.is_empty() {
            return None;
        }
        let id = SiteId::new(self.file.clone(), line);
        let conditions: Vec<String> = atoms.iter().map(ToString::to_string).collect();
        tracing::trace!(site = %id, ?conditions, "registered conditional site");
        let _ = self
            .sites
            .insert(id.clone(), ConditionalSite::new(id, conditions));

        let mut args = Vec::with_capacity(atoms.len() + 2);
        args.push(Expr::str(self.file.clone()));
        args.push(Expr::int(i64::try_from(line).unwrap_or(i64::MAX)));
        args.extend(atoms.into_iter().cloned());
        Some(Stmt::expr(line, Expr::call(PROBE_NAME, args)))
    }
}

impl VisitMut for Instrumenter {
    fn visit_block_mut(&mut self, block: &mut Vec<Stmt>) {
        // nested blocks first
        walk_block_mut(self, block);
        let original = std::mem::take(block);
        block.reserve(original.len());
        for stmt in original {
            if let StmtKind::If { test, .. } = &stmt.kind {
                if let Some(probe) = self.probe_for(stmt.line, test) {
                    block.push(probe);
                }
            }
            block.push(stmt);
        }
    }
}

/// Parse and instrument `source`
pub fn instrument(source: &str, file: &str) -> Result<(Module, SiteMap), SyntaxError> {
    let module = parse(source, file)?;
    Ok(Instrumenter::new(file).instrument(module))
}
