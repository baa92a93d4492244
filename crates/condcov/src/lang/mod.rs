//! Front end for the instrumented language
//!
//! Target and test files are written in a small indentation-structured
//! scripting language (a Python subset). This module turns source text into
//! a [`Module`] tree, renders trees back to source, and offers visitors used
//! by the instrumenter and the test rewriter.
//!
//! ```text
//! source ──► Lexer ──► tokens ──► Parser ──► Module ──► (VisitMut) ──► Module'
//!                                               │
//!                                               └──► Display (unparse)
//! ```

pub mod ast;
mod parser;
mod token;
mod unparse;
pub mod visit;

pub use ast::{
    BinOp, BoolOp, CmpOp, Constant, Expr, FunctionDef, ImportName, Keyword, Module, Param, Stmt,
    StmtKind, UnaryOp,
};
pub use parser::Parser;
pub use token::{Kw, Lexer, Token, TokenKind};
pub(crate) use unparse::{float_repr, str_repr};

use thiserror::Error;

/// A lexing or parsing failure with its location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: syntax error: {message}")]
pub struct SyntaxError {
    /// File identifier the source came from
    pub file: String,
    /// 1-based line of the offending token
    pub line: usize,
    /// What went wrong
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Parse a whole source file
///
/// `file` is only used to label errors.
pub fn parse(source: &str, file: &str) -> Result<Module, SyntaxError> {
    let tokens = Lexer::new(source, file).tokenize()?;
    Parser::new(tokens, file).parse_module()
}
