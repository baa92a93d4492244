//! Rendering trees back to source text
//!
//! Output is canonical rather than faithful: spacing is normalised and only
//! the parentheses required by precedence are emitted, so `(a) and (b)`
//! renders as `a and b`.

use std::fmt::{self, Display, Formatter, Write};

use super::ast::{BinOp, BoolOp, Constant, Expr, Module, Stmt, StmtKind, UnaryOp};

/// Binding strength, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Test = 1,
    Or,
    And,
    Not,
    Cmp,
    Arith,
    Term,
    Factor,
    Power,
    Atom,
}

impl Prec {
    const fn next(self) -> Self {
        match self {
            Self::Test => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Not,
            Self::Not => Self::Cmp,
            Self::Cmp => Self::Arith,
            Self::Arith => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Power,
            Self::Power | Self::Atom => Self::Atom,
        }
    }
}

fn precedence(expr: &Expr) -> Prec {
    match expr {
        Expr::IfExp { .. } => Prec::Test,
        Expr::BoolOp { op: BoolOp::Or, .. } => Prec::Or,
        Expr::BoolOp { op: BoolOp::And, .. } => Prec::And,
        Expr::UnaryOp { op: UnaryOp::Not, .. } => Prec::Not,
        Expr::UnaryOp { .. } => Prec::Factor,
        Expr::Compare { .. } => Prec::Cmp,
        Expr::BinOp { op, .. } => binop_precedence(*op),
        Expr::Name(_)
        | Expr::Constant(_)
        | Expr::Call { .. }
        | Expr::List(_)
        | Expr::Tuple(_)
        | Expr::Subscript { .. } => Prec::Atom,
    }
}

const fn binop_precedence(op: BinOp) -> Prec {
    match op {
        BinOp::Add | BinOp::Sub => Prec::Arith,
        BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => Prec::Term,
        BinOp::Pow => Prec::Power,
    }
}

/// Python-style `repr` of a string literal
pub(crate) fn str_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python-style `repr` of a float
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        String::from(if value > 0.0 { "inf" } else { "-inf" })
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else if value.abs() >= 1e16 {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::Str(s) => f.write_str(&str_repr(s)),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_expr(f, self, Prec::Test)
    }
}

fn write_expr(f: &mut Formatter<'_>, expr: &Expr, outer: Prec) -> fmt::Result {
    let own = precedence(expr);
    let wrap = own < outer;
    if wrap {
        f.write_char('(')?;
    }

    match expr {
        Expr::Name(id) => f.write_str(id)?,
        Expr::Constant(c) => write!(f, "{c}")?,
        Expr::BoolOp { op, values } => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op.keyword())?;
                }
                write_expr(f, value, own.next())?;
            }
        }
        Expr::UnaryOp { op, operand } => match op {
            UnaryOp::Not => {
                f.write_str("not ")?;
                write_expr(f, operand, Prec::Not)?;
            }
            UnaryOp::Neg | UnaryOp::Pos => {
                f.write_char(if *op == UnaryOp::Neg { '-' } else { '+' })?;
                write_expr(f, operand, Prec::Factor)?;
            }
        },
        Expr::BinOp { left, op, right } => {
            let (left_prec, right_prec) = if *op == BinOp::Pow {
                (own.next(), own)
            } else {
                (own, own.next())
            };
            write_expr(f, left, left_prec)?;
            write!(f, " {} ", op.symbol())?;
            write_expr(f, right, right_prec)?;
        }
        Expr::Compare {
            left,
            ops,
            comparators,
        } => {
            write_expr(f, left, Prec::Cmp.next())?;
            for (op, comparator) in ops.iter().zip(comparators) {
                write!(f, " {} ", op.symbol())?;
                write_expr(f, comparator, Prec::Cmp.next())?;
            }
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            write_expr(f, func, Prec::Atom)?;
            f.write_char('(')?;
            let mut first = true;
            for arg in args {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write_expr(f, arg, Prec::Test)?;
            }
            for kw in keywords {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "{}=", kw.name)?;
                write_expr(f, &kw.value, Prec::Test)?;
            }
            f.write_char(')')?;
        }
        Expr::List(items) => {
            f.write_char('[')?;
            write_items(f, items)?;
            f.write_char(']')?;
        }
        Expr::Tuple(items) => {
            f.write_char('(')?;
            write_items(f, items)?;
            if items.len() == 1 {
                f.write_char(',')?;
            }
            f.write_char(')')?;
        }
        Expr::Subscript { value, index } => {
            write_expr(f, value, Prec::Atom)?;
            f.write_char('[')?;
            write_expr(f, index, Prec::Test)?;
            f.write_char(']')?;
        }
        Expr::IfExp { test, body, orelse } => {
            write_expr(f, body, Prec::Test.next())?;
            f.write_str(" if ")?;
            write_expr(f, test, Prec::Test.next())?;
            f.write_str(" else ")?;
            write_expr(f, orelse, Prec::Test)?;
        }
    }

    if wrap {
        f.write_char(')')?;
    }
    Ok(())
}

fn write_items(f: &mut Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_expr(f, item, Prec::Test)?;
    }
    Ok(())
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_block(f, &self.body, 0)
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_block(f: &mut Formatter<'_>, stmts: &[Stmt], depth: usize) -> fmt::Result {
    if stmts.is_empty() {
        return writeln!(f, "{:width$}pass", "", width = depth * 4);
    }
    for stmt in stmts {
        write_stmt(f, stmt, depth)?;
    }
    Ok(())
}

fn write_stmt(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = depth * 4;
    write!(f, "{:pad$}", "")?;

    match &stmt.kind {
        StmtKind::Expr(expr) => writeln!(f, "{expr}"),
        StmtKind::Assign { target, value } => writeln!(f, "{target} = {value}"),
        StmtKind::AugAssign { target, op, value } => {
            writeln!(f, "{target} {}= {value}", op.symbol())
        }
        StmtKind::FunctionDef(def) => {
            write!(f, "def {}(", def.name)?;
            for (i, param) in def.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&param.name)?;
                if let Some(default) = &param.default {
                    write!(f, "={default}")?;
                }
            }
            writeln!(f, "):")?;
            write_block(f, &def.body, depth + 1)
        }
        StmtKind::Return(None) => writeln!(f, "return"),
        StmtKind::Return(Some(value)) => writeln!(f, "return {value}"),
        StmtKind::If { .. } => write_if(f, stmt, depth, "if"),
        StmtKind::While { test, body } => {
            writeln!(f, "while {test}:")?;
            write_block(f, body, depth + 1)
        }
        StmtKind::For { target, iter, body } => {
            writeln!(f, "for {target} in {iter}:")?;
            write_block(f, body, depth + 1)
        }
        StmtKind::Assert { test, msg: None } => writeln!(f, "assert {test}"),
        StmtKind::Assert {
            test,
            msg: Some(msg),
        } => writeln!(f, "assert {test}, {msg}"),
        StmtKind::Import { module, alias } => match alias {
            Some(alias) => writeln!(f, "import {module} as {alias}"),
            None => writeln!(f, "import {module}"),
        },
        StmtKind::ImportFrom { module, names } => {
            write!(f, "from {module} import ")?;
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&name.name)?;
                if let Some(alias) = &name.alias {
                    write!(f, " as {alias}")?;
                }
            }
            writeln!(f)
        }
        StmtKind::Pass => writeln!(f, "pass"),
        StmtKind::Break => writeln!(f, "break"),
        StmtKind::Continue => writeln!(f, "continue"),
    }
}

/// Writes an `if` whose leading indentation is already emitted
fn write_if(f: &mut Formatter<'_>, stmt: &Stmt, depth: usize, keyword: &str) -> fmt::Result {
    let StmtKind::If { test, body, orelse } = &stmt.kind else {
        return Ok(());
    };
    writeln!(f, "{keyword} {test}:")?;
    write_block(f, body, depth + 1)?;

    match orelse.as_slice() {
        [] => Ok(()),
        [nested] if matches!(nested.kind, StmtKind::If { .. }) => {
            write!(f, "{:width$}", "", width = depth * 4)?;
            write_if(f, nested, depth, "elif")
        }
        _ => {
            writeln!(f, "{:width$}else:", "", width = depth * 4)?;
            write_block(f, orelse, depth + 1)
        }
    }
}
