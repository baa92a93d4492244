//! Atomic condition extraction

use crate::lang::{Expr, UnaryOp};

/// Flatten `and` / `or` / `not` into atomic sub-expressions, left to right
///
/// `not x` contributes the atomics of `x` unchanged, so the polarity of a
/// negation is not tracked: `not (a and b)` decomposes exactly like
/// `a and b`. Anything else is a single atomic.
#[must_use]
pub fn decompose(expr: &Expr) -> Vec<&Expr> {
    let mut atoms = Vec::new();
    collect(expr, &mut atoms);
    atoms
}

fn collect<'a>(expr: &'a Expr, atoms: &mut Vec<&'a Expr>) {
    match expr {
        Expr::UnaryOp {
            op: UnaryOp::Not,
            operand,
        } => collect(operand, atoms),
        Expr::BoolOp { values, .. } => {
            for value in values {
                collect(value, atoms);
            }
        }
        other => atoms.push(other),
    }
}
