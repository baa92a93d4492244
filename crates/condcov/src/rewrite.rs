//! Test file rewriting
//!
//! Test files import the target's functions by name. Since the target is not
//! importable, the rewriter:
//!
//! 1. drops `from <target> import ...` and `import <target>`
//! 2. renames calls to tracked functions inside `test_*` functions to
//!    `imported_<name>`, which the executor binds to the loaded callables
//! 3. lifts each `assert <tracked call> == <expected>` into its own
//!    zero-argument unit `test_assert_<n>`, so one failing case cannot hide
//!    its siblings
//!
//! ```text
//! from sample_code import calculate_discount      def test_assert_1():
//!                                                     assert imported_calculate_discount(66, 'basic', True) == 0.5
//! def test_discount():                       ──►  def test_discount():
//!     assert calculate_discount(66, ...) == 0.5       pass
//! ```

use std::collections::BTreeSet;

use crate::lang::visit::{walk_expr_mut, NameCollector, VisitMut};
use crate::lang::{parse, CmpOp, Expr, FunctionDef, Module, Stmt, StmtKind, SyntaxError};

/// Prefix that marks a test unit
pub const TEST_PREFIX: &str = "test_";

/// Prefix of the aliases tracked functions are bound under in test scopes
pub const ALIAS_PREFIX: &str = "imported_";

/// Prefix of units synthesized from assertions
pub const ASSERT_UNIT_PREFIX: &str = "test_assert_";

/// Alias a tracked function is reachable under in a rewritten test file
#[must_use]
pub fn alias_for(name: &str) -> String {
    format!("{ALIAS_PREFIX}{name}")
}

/// Whether `name` follows the test naming convention
#[must_use]
pub fn is_test_name(name: &str) -> bool {
    name.starts_with(TEST_PREFIX)
}

/// Renames calls of tracked functions to their aliases
struct CallRenamer<'a> {
    tracked: &'a BTreeSet<String>,
    renamed: usize,
}

impl VisitMut for CallRenamer<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let Expr::Call { func, .. } = expr {
            if let Expr::Name(id) = func.as_mut() {
                if self.tracked.contains(id.as_str()) {
                    *id = alias_for(id);
                    self.renamed += 1;
                }
            }
        }
        walk_expr_mut(self, expr);
    }
}

/// Rewrites one test file's tree against one target
#[derive(Debug, Clone)]
pub struct TestRewriter {
    target_module: String,
    tracked: BTreeSet<String>,
    synthesized: usize,
    renamed: usize,
}

impl TestRewriter {
    /// Create a rewriter for tests of `target_module` calling `tracked`
    #[must_use]
    pub fn new<I, S>(target_module: impl Into<String>, tracked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_module: target_module.into(),
            tracked: tracked.into_iter().map(Into::into).collect(),
            synthesized: 0,
            renamed: 0,
        }
    }

    /// Units synthesized by the last [`rewrite`](Self::rewrite)
    #[must_use]
    pub const fn synthesized(&self) -> usize {
        self.synthesized
    }

    /// Calls renamed by the last [`rewrite`](Self::rewrite)
    #[must_use]
    pub const fn renamed(&self) -> usize {
        self.renamed
    }

    /// Rewrite `module`; unit numbering restarts at 1 for every call
    pub fn rewrite(&mut self, module: Module) -> Module {
        self.synthesized = 0;
        self.renamed = 0;
        let mut body = Vec::with_capacity(module.body.len());
        for stmt in module.body {
            let line = stmt.line;
            if self.imports_target(&stmt) {
                tracing::debug!(line, module = %self.target_module, "dropped target import");
                continue;
            }
            if self.is_qualifying(&stmt) {
                body.push(self.synthesize(stmt));
                continue;
            }
            match stmt.kind {
                StmtKind::FunctionDef(def) if is_test_name(&def.name) => {
                    self.rewrite_test_function(line, def, &mut body);
                }
                kind => body.push(Stmt::new(line, kind)),
            }
        }
        tracing::debug!(
            synthesized = self.synthesized,
            renamed = self.renamed,
            "rewrote test module"
        );
        Module::new(body)
    }

    fn rewrite_test_function(&mut self, line: usize, mut def: FunctionDef, out: &mut Vec<Stmt>) {
        let locals = bound_names(&def);
        let mut kept = Vec::with_capacity(def.body.len());
        for stmt in std::mem::take(&mut def.body) {
            if self.is_qualifying(&stmt) && !references_any(&stmt, &locals) {
                out.push(self.synthesize(stmt));
            } else {
                kept.push(stmt);
            }
        }
        self.rename_calls(&mut kept);
        if kept.is_empty() {
            kept.push(Stmt::new(line, StmtKind::Pass));
        }
        def.body = kept;
        out.push(Stmt::new(line, StmtKind::FunctionDef(def)));
    }

    fn imports_target(&self, stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Import { module, .. } | StmtKind::ImportFrom { module, .. } => {
                *module == self.target_module
            }
            _ => false,
        }
    }

    /// `assert <tracked call> == <expr>` with exactly one `==`
    fn is_qualifying(&self, stmt: &Stmt) -> bool {
        let StmtKind::Assert {
            test: Expr::Compare {
                left,
                ops,
                comparators,
            },
            ..
        } = &stmt.kind
        else {
            return false;
        };
        ops.as_slice() == [CmpOp::Eq]
            && comparators.len() == 1
            && left
                .called_name()
                .is_some_and(|name| self.tracked.contains(name))
    }

    fn synthesize(&mut self, assertion: Stmt) -> Stmt {
        self.synthesized += 1;
        let name = format!("{ASSERT_UNIT_PREFIX}{}", self.synthesized);
        let line = assertion.line;
        let mut body = vec![assertion];
        self.rename_calls(&mut body);
        tracing::trace!(unit = %name, line, "synthesized assertion unit");
        Stmt::new(line, StmtKind::FunctionDef(FunctionDef::nullary(name, body)))
    }

    fn rename_calls(&mut self, block: &mut Vec<Stmt>) {
        let mut renamer = CallRenamer {
            tracked: &self.tracked,
            renamed: 0,
        };
        renamer.visit_block_mut(block);
        self.renamed += renamer.renamed;
    }
}

/// Names a function binds locally, not descending into nested `def` bodies
fn bound_names(def: &FunctionDef) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = def.params.iter().map(|p| p.name.clone()).collect();
    collect_bindings(&def.body, &mut names);
    names
}

fn collect_bindings(block: &[Stmt], names: &mut BTreeSet<String>) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::Assign { target, .. } | StmtKind::AugAssign { target, .. } => {
                names.insert(target.clone());
            }
            StmtKind::FunctionDef(def) => {
                names.insert(def.name.clone());
            }
            StmtKind::For { target, body, .. } => {
                names.insert(target.clone());
                collect_bindings(body, names);
            }
            StmtKind::If { body, orelse, .. } => {
                collect_bindings(body, names);
                collect_bindings(orelse, names);
            }
            StmtKind::While { body, .. } => collect_bindings(body, names),
            StmtKind::Import { module, alias } => {
                names.insert(alias.clone().unwrap_or_else(|| module.clone()));
            }
            StmtKind::ImportFrom { names: imported, .. } => {
                for item in imported {
                    names.insert(item.alias.clone().unwrap_or_else(|| item.name.clone()));
                }
            }
            _ => {}
        }
    }
}

fn references_any(stmt: &Stmt, names: &BTreeSet<String>) -> bool {
    let StmtKind::Assert { test, msg } = &stmt.kind else {
        return false;
    };
    std::iter::once(test)
        .chain(msg.as_ref())
        .flat_map(NameCollector::from_expr)
        .any(|name| names.contains(&name))
}

/// Parse and rewrite a test file
pub fn rewrite<I, S>(
    source: &str,
    file: &str,
    target_module: &str,
    tracked: I,
) -> Result<Module, SyntaxError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let module = parse(source, file)?;
    Ok(TestRewriter::new(target_module, tracked).rewrite(module))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rewritten(source: &str) -> String {
        rewrite(source, "test_file.py", "sample_code", ["calculate_discount"])
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_target_imports_are_removed() {
        let out = rewritten(concat!(
            "from sample_code import calculate_discount\n",
            "import sample_code\n",
            "from other import thing\n",
            "x = 1\n",
        ));
        assert_eq!(out, "from other import thing\nx = 1\n");
    }

    #[test]
    fn test_assertions_in_test_function_become_units() {
        let out = rewritten(concat!(
            "from sample_code import calculate_discount\n",
            "def test_calculate_discount():\n",
            "    assert calculate_discount(70, 'regular', True) == 0.5\n",
            "    assert calculate_discount(60, 'gold', False) == 0.3\n",
        ));
        assert_eq!(
            out,
            concat!(
                "def test_assert_1():\n",
                "    assert imported_calculate_discount(70, 'regular', True) == 0.5\n",
                "def test_assert_2():\n",
                "    assert imported_calculate_discount(60, 'gold', False) == 0.3\n",
                "def test_calculate_discount():\n",
                "    pass\n",
            )
        );
    }

    #[test]
    fn test_numbering_restarts_per_rewrite() {
        let mut rewriter = TestRewriter::new("sample_code", ["f"]);
        let module = parse("assert f(1) == 1\nassert f(2) == 2\n", "t.py").unwrap();
        let _ = rewriter.rewrite(module.clone());
        assert_eq!(rewriter.synthesized(), 2);
        let out = rewriter.rewrite(module);
        assert_eq!(rewriter.synthesized(), 2);
        assert!(out.to_string().starts_with("def test_assert_1():"));
    }

    #[test]
    fn test_module_level_assertion_is_replaced_in_place() {
        let out = rewritten("x = 1\nassert calculate_discount(66, 'basic', True) == 0.5\ny = 2\n");
        assert_eq!(
            out,
            concat!(
                "x = 1\n",
                "def test_assert_1():\n",
                "    assert imported_calculate_discount(66, 'basic', True) == 0.5\n",
                "y = 2\n",
            )
        );
    }

    #[test]
    fn test_nested_call_arguments_are_renamed() {
        let out = rewritten(concat!(
            "def test_nested():\n",
            "    total = calculate_discount(calculate_discount(1, 'a', True), 'b', False)\n",
            "    assert total < 1\n",
        ));
        assert_eq!(
            out,
            concat!(
                "def test_nested():\n",
                "    total = imported_calculate_discount(imported_calculate_discount(1, 'a', True), 'b', False)\n",
                "    assert total < 1\n",
            )
        );
    }

    #[test]
    fn test_non_qualifying_assertions_stay() {
        let out = rewritten(concat!(
            "def test_other():\n",
            "    assert calculate_discount(1, 'a', True) != 0.5\n",
            "    assert 0.5 == calculate_discount(1, 'a', True)\n",
            "    assert len('ab') == 2\n",
        ));
        assert_eq!(
            out,
            concat!(
                "def test_other():\n",
                "    assert imported_calculate_discount(1, 'a', True) != 0.5\n",
                "    assert 0.5 == imported_calculate_discount(1, 'a', True)\n",
                "    assert len('ab') == 2\n",
            )
        );
    }

    #[test]
    fn test_assertions_using_locals_are_not_hoisted() {
        let out = rewritten(concat!(
            "def test_locals(age=70):\n",
            "    expected = 0.5\n",
            "    assert calculate_discount(age, 'regular', True) == 0.5\n",
            "    assert calculate_discount(70, 'regular', True) == expected\n",
            "    assert calculate_discount(70, 'regular', True) == 0.5\n",
        ));
        assert_eq!(
            out,
            concat!(
                "def test_assert_1():\n",
                "    assert imported_calculate_discount(70, 'regular', True) == 0.5\n",
                "def test_locals(age=70):\n",
                "    expected = 0.5\n",
                "    assert imported_calculate_discount(age, 'regular', True) == 0.5\n",
                "    assert imported_calculate_discount(70, 'regular', True) == expected\n",
            )
        );
    }

    #[test]
    fn test_helpers_are_not_touched() {
        let source = "def helper():\n    return calculate_discount(1, 'a', True)\n";
        assert_eq!(rewritten(source), source);
    }

    #[test]
    fn test_chained_equality_does_not_qualify() {
        let out = rewritten("assert calculate_discount(1, 'a', True) == 0.0 == 0.0\n");
        assert_eq!(out, "assert calculate_discount(1, 'a', True) == 0.0 == 0.0\n");
    }

    #[test]
    fn test_rename_counts() {
        let mut rewriter = TestRewriter::new("sample_code", ["f", "g"]);
        let module = parse("def test_x():\n    y = f(g(1))\n    assert y\n", "t.py").unwrap();
        let _ = rewriter.rewrite(module);
        assert_eq!(rewriter.renamed(), 2);
        assert_eq!(rewriter.synthesized(), 0);
    }

    #[test]
    fn test_naming_helpers() {
        assert_eq!(alias_for("f"), "imported_f");
        assert!(is_test_name("test_assert_3"));
        assert!(!is_test_name("helper_test"));
    }
}
