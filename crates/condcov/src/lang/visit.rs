//! Tree visitors
//!
//! Modeled on `syn::visit` / `syn::visit_mut`: each trait method defaults to
//! a free `walk_*` function that recurses into children, so an implementor
//! overrides only the nodes it cares about and calls the walker to continue.

use super::ast::{Expr, Stmt, StmtKind};

/// Read-only traversal
pub trait Visit {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// In-place traversal
pub trait VisitMut {
    /// Visit a statement list; override to insert or remove statements
    fn visit_block_mut(&mut self, block: &mut Vec<Stmt>) {
        walk_block_mut(self, block);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(expr) => v.visit_expr(expr),
        StmtKind::Assign { value, .. } | StmtKind::AugAssign { value, .. } => v.visit_expr(value),
        StmtKind::FunctionDef(def) => {
            for default in def.params.iter().filter_map(|p| p.default.as_ref()) {
                v.visit_expr(default);
            }
            for s in &def.body {
                v.visit_stmt(s);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
        StmtKind::If { test, body, orelse } => {
            v.visit_expr(test);
            for s in body.iter().chain(orelse) {
                v.visit_stmt(s);
            }
        }
        StmtKind::While { test, body } => {
            v.visit_expr(test);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::For { iter, body, .. } => {
            v.visit_expr(iter);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::Assert { test, msg } => {
            v.visit_expr(test);
            if let Some(msg) = msg {
                v.visit_expr(msg);
            }
        }
        StmtKind::Import { .. }
        | StmtKind::ImportFrom { .. }
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue => {}
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Name(_) | Expr::Constant(_) => {}
        Expr::BoolOp { values, .. } | Expr::List(values) | Expr::Tuple(values) => {
            for value in values {
                v.visit_expr(value);
            }
        }
        Expr::UnaryOp { operand, .. } => v.visit_expr(operand),
        Expr::BinOp { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::Compare {
            left, comparators, ..
        } => {
            v.visit_expr(left);
            for c in comparators {
                v.visit_expr(c);
            }
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            v.visit_expr(func);
            for arg in args {
                v.visit_expr(arg);
            }
            for kw in keywords {
                v.visit_expr(&kw.value);
            }
        }
        Expr::Subscript { value, index } => {
            v.visit_expr(value);
            v.visit_expr(index);
        }
        Expr::IfExp { test, body, orelse } => {
            v.visit_expr(body);
            v.visit_expr(test);
            v.visit_expr(orelse);
        }
    }
}

pub fn walk_block_mut<V: VisitMut + ?Sized>(v: &mut V, block: &mut Vec<Stmt>) {
    for stmt in block.iter_mut() {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(expr) => v.visit_expr_mut(expr),
        StmtKind::Assign { value, .. } | StmtKind::AugAssign { value, .. } => {
            v.visit_expr_mut(value);
        }
        StmtKind::FunctionDef(def) => {
            for default in def.params.iter_mut().filter_map(|p| p.default.as_mut()) {
                v.visit_expr_mut(default);
            }
            v.visit_block_mut(&mut def.body);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr_mut(value);
            }
        }
        StmtKind::If { test, body, orelse } => {
            v.visit_expr_mut(test);
            v.visit_block_mut(body);
            v.visit_block_mut(orelse);
        }
        StmtKind::While { test, body } => {
            v.visit_expr_mut(test);
            v.visit_block_mut(body);
        }
        StmtKind::For { iter, body, .. } => {
            v.visit_expr_mut(iter);
            v.visit_block_mut(body);
        }
        StmtKind::Assert { test, msg } => {
            v.visit_expr_mut(test);
            if let Some(msg) = msg {
                v.visit_expr_mut(msg);
            }
        }
        StmtKind::Import { .. }
        | StmtKind::ImportFrom { .. }
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue => {}
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Name(_) | Expr::Constant(_) => {}
        Expr::BoolOp { values, .. } | Expr::List(values) | Expr::Tuple(values) => {
            for value in values {
                v.visit_expr_mut(value);
            }
        }
        Expr::UnaryOp { operand, .. } => v.visit_expr_mut(operand),
        Expr::BinOp { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::Compare {
            left, comparators, ..
        } => {
            v.visit_expr_mut(left);
            for c in comparators {
                v.visit_expr_mut(c);
            }
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            v.visit_expr_mut(func);
            for arg in args {
                v.visit_expr_mut(arg);
            }
            for kw in keywords {
                v.visit_expr_mut(&mut kw.value);
            }
        }
        Expr::Subscript { value, index } => {
            v.visit_expr_mut(value);
            v.visit_expr_mut(index);
        }
        Expr::IfExp { test, body, orelse } => {
            v.visit_expr_mut(body);
            v.visit_expr_mut(test);
            v.visit_expr_mut(orelse);
        }
    }
}

/// Collects every identifier an expression or statement reads
#[derive(Debug, Default)]
pub struct NameCollector {
    /// Names seen, in first-seen order
    pub names: Vec<String>,
}

impl NameCollector {
    /// Names read by `expr`
    #[must_use]
    pub fn from_expr(expr: &Expr) -> Vec<String> {
        let mut collector = Self::default();
        collector.visit_expr(expr);
        collector.names
    }
}

impl Visit for NameCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Name(id) = expr {
            if !self.names.contains(id) {
                self.names.push(id.clone());
            }
        }
        walk_expr(self, expr);
    }
}
