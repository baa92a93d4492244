//! Recursive descent parser
//!
//! Grammar (expression part, lowest precedence first):
//! ```text
//! test       ::= or_test ['if' or_test 'else' test]
//! or_test    ::= and_test ('or' and_test)*
//! and_test   ::= not_test ('and' not_test)*
//! not_test   ::= 'not' not_test | comparison
//! comparison ::= arith (comp_op arith)*
//! arith      ::= term (('+' | '-') term)*
//! term       ::= factor (('*' | '/' | '//' | '%') factor)*
//! factor     ::= ('+' | '-') factor | power
//! power      ::= atom trailer* ['**' factor]
//! trailer    ::= '(' arguments ')' | '[' test ']'
//! atom       ::= NAME | NUMBER | STRING+ | 'True' | 'False' | 'None'
//!              | '(' [test (',' test)* [',']] ')' | '[' [test (',' test)* [',']] ']'
//! ```

use super::ast::{
    BinOp, BoolOp, CmpOp, Constant, Expr, FunctionDef, ImportName, Keyword, Module, Param, Stmt,
    StmtKind, UnaryOp,
};
use super::token::{Kw, Token, TokenKind};
use super::SyntaxError;

type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest nesting of expressions and blocks the parser accepts
pub const MAX_NESTING: usize = 200;

/// Parser over a token stream produced by [`super::Lexer`]
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    depth: usize,
}

impl Parser {
    /// Creates a new parser from tokens
    #[must_use]
    pub fn new(tokens: Vec<Token>, file: impl Into<String>) -> Self {
        Self {
            tokens,
            pos: 0,
            file: file.into(),
            depth: 0,
        }
    }

    /// Parses tokens into a module
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut body = Vec::new();
        while !self.check(&TokenKind::Eof) {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            body.extend(self.parse_statement()?);
        }
        Ok(Module::new(body))
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len().saturating_sub(1))]
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn line(&self) -> usize {
        self.current().line
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn check_kw(&self, kw: Kw) -> bool {
        self.current().kind == TokenKind::Keyword(kw)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Kw) -> bool {
        self.eat(&TokenKind::Keyword(kw))
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> ParseResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_name(&mut self, what: &str) -> ParseResult<String> {
        match &self.current().kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError::new(
            self.file.clone(),
            token.line,
            format!("expected {expected}, found {}", token.kind.describe()),
        )
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new(
                self.file.clone(),
                self.line(),
                format!("too many nested expressions or blocks (limit {MAX_NESTING})"),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Vec<Stmt>> {
        let line = self.line();
        let stmt = match self.current().kind {
            TokenKind::Keyword(Kw::Def) => self.parse_def()?,
            TokenKind::Keyword(Kw::If) => {
                self.advance();
                self.parse_if_chain(line)?
            }
            TokenKind::Keyword(Kw::While) => {
                self.advance();
                let test = self.parse_test()?;
                let body = self.parse_suite()?;
                Stmt::new(line, StmtKind::While { test, body })
            }
            TokenKind::Keyword(Kw::For) => {
                self.advance();
                let target = self.expect_name("loop variable")?;
                if !self.eat_kw(Kw::In) {
                    return Err(self.unexpected("'in'"));
                }
                let iter = self.parse_testlist()?;
                let body = self.parse_suite()?;
                Stmt::new(line, StmtKind::For { target, iter, body })
            }
            TokenKind::Indent => return Err(self.unexpected("statement (unexpected indent)")),
            _ => return self.parse_simple_statements(),
        };
        Ok(vec![stmt])
    }

    fn parse_def(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        self.advance();
        let name = self.expect_name("function name")?;
        self.expect(&TokenKind::LParen, "'('")?;

        let mut params: Vec<Param> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let param_name = self.expect_name("parameter name")?;
            if params.iter().any(|p| p.name == param_name) {
                return Err(SyntaxError::new(
                    self.file.clone(),
                    line,
                    format!("duplicate argument '{param_name}' in function definition"),
                ));
            }
            let default = if self.eat(&TokenKind::Assign) {
                Some(self.parse_test()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(SyntaxError::new(
                        self.file.clone(),
                        line,
                        "non-default argument follows default argument",
                    ));
                }
                None
            };
            params.push(Param {
                name: param_name,
                default,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        let body = self.parse_suite()?;

        Ok(Stmt::new(
            line,
            StmtKind::FunctionDef(FunctionDef { name, params, body }),
        ))
    }

    /// Parses `test: suite` plus any `elif`/`else` tail; the `if`/`elif`
    /// keyword has already been consumed.
    fn parse_if_chain(&mut self, line: usize) -> ParseResult<Stmt> {
        let test = self.parse_test()?;
        let body = self.parse_suite()?;

        let orelse = if self.check_kw(Kw::Elif) {
            let elif_line = self.line();
            self.advance();
            vec![self.parse_if_chain(elif_line)?]
        } else if self.eat_kw(Kw::Else) {
            self.parse_suite()?
        } else {
            Vec::new()
        };

        Ok(Stmt::new(line, StmtKind::If { test, body, orelse }))
    }

    fn parse_suite(&mut self) -> ParseResult<Vec<Stmt>> {
        self.nested(Self::parse_suite_body)
    }

    fn parse_suite_body(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(&TokenKind::Colon, "':'")?;

        if !self.eat(&TokenKind::Newline) {
            return self.parse_simple_statements();
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(self.unexpected("an indented block"));
        }

        let mut body = Vec::new();
        while !self.eat(&TokenKind::Dedent) {
            if self.check(&TokenKind::Eof) {
                return Err(self.unexpected("dedent"));
            }
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            body.extend(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_simple_statements(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_small_statement()?];
        while self.eat(&TokenKind::Semicolon) {
            if self.check(&TokenKind::Newline) {
                break;
            }
            stmts.push(self.parse_small_statement()?);
        }
        if !self.eat(&TokenKind::Newline) && !self.check(&TokenKind::Eof) {
            return Err(self.unexpected("end of line"));
        }
        Ok(stmts)
    }

    fn parse_small_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let kind = match self.current().kind {
            TokenKind::Keyword(Kw::Pass) => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Keyword(Kw::Break) => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Keyword(Kw::Continue) => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Keyword(Kw::Return) => {
                self.advance();
                if self.at_statement_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_testlist()?))
                }
            }
            TokenKind::Keyword(Kw::Assert) => {
                self.advance();
                let test = self.parse_test()?;
                let msg = if self.eat(&TokenKind::Comma) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            TokenKind::Keyword(Kw::Import) => {
                self.advance();
                let module = self.parse_dotted_name()?;
                let alias = if self.eat_kw(Kw::As) {
                    Some(self.expect_name("alias")?)
                } else {
                    None
                };
                StmtKind::Import { module, alias }
            }
            TokenKind::Keyword(Kw::From) => {
                self.advance();
                self.parse_import_from()?
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Stmt::new(line, kind))
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    fn parse_dotted_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_name("module name")?;
        while self.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_name("module name")?);
        }
        Ok(name)
    }

    fn parse_import_from(&mut self) -> ParseResult<StmtKind> {
        let module = self.parse_dotted_name()?;
        if !self.eat_kw(Kw::Import) {
            return Err(self.unexpected("'import'"));
        }

        let parenthesized = self.eat(&TokenKind::LParen);
        let mut names = Vec::new();
        loop {
            let name = if self.eat(&TokenKind::Star) {
                "*".to_string()
            } else {
                self.expect_name("imported name")?
            };
            let alias = if self.eat_kw(Kw::As) {
                Some(self.expect_name("alias")?)
            } else {
                None
            };
            names.push(ImportName { name, alias });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(StmtKind::ImportFrom { module, names })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<StmtKind> {
        let expr = self.parse_testlist()?;

        let aug_op = match self.current().kind {
            TokenKind::PlusAssign => Some(BinOp::Add),
            TokenKind::MinusAssign => Some(BinOp::Sub),
            TokenKind::StarAssign => Some(BinOp::Mul),
            _ => None,
        };

        if let Some(op) = aug_op {
            let target = self.assignment_target(expr)?;
            self.advance();
            let value = self.parse_testlist()?;
            return Ok(StmtKind::AugAssign { target, op, value });
        }

        if self.eat(&TokenKind::Assign) {
            let target = self.assignment_target(expr)?;
            let value = self.parse_testlist()?;
            if self.check(&TokenKind::Assign) {
                return Err(self.unexpected("end of assignment (chained assignment is not supported)"));
            }
            return Ok(StmtKind::Assign { target, value });
        }

        Ok(StmtKind::Expr(expr))
    }

    fn assignment_target(&self, expr: Expr) -> ParseResult<String> {
        match expr {
            Expr::Name(name) => Ok(name),
            _ => Err(SyntaxError::new(
                self.file.clone(),
                self.line(),
                "cannot assign to expression; only simple names are assignable",
            )),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// `test (',' test)* [',']`, producing a tuple when a comma is present
    fn parse_testlist(&mut self) -> ParseResult<Expr> {
        let first = self.parse_test()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.at_statement_end() || self.check(&TokenKind::Assign) {
                break;
            }
            items.push(self.parse_test()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn parse_test(&mut self) -> ParseResult<Expr> {
        self.nested(Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let body = self.parse_or_test()?;
        if !self.eat_kw(Kw::If) {
            return Ok(body);
        }
        let test = self.parse_or_test()?;
        if !self.eat_kw(Kw::Else) {
            return Err(self.unexpected("'else' in conditional expression"));
        }
        let orelse = self.parse_test()?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    fn parse_or_test(&mut self) -> ParseResult<Expr> {
        let first = self.parse_and_test()?;
        if !self.check_kw(Kw::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(Kw::Or) {
            values.push(self.parse_and_test()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::Or,
            values,
        })
    }

    fn parse_and_test(&mut self) -> ParseResult<Expr> {
        let first = self.parse_not_test()?;
        if !self.check_kw(Kw::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_kw(Kw::And) {
            values.push(self.parse_not_test()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::And,
            values,
        })
    }

    fn parse_not_test(&mut self) -> ParseResult<Expr> {
        if self.eat_kw(Kw::Not) {
            let operand = self.nested(Self::parse_not_test)?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_arith()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        while let Some(op) = self.comparison_operator() {
            ops.push(op);
            comparators.push(self.parse_arith()?);
        }

        if ops.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                ops,
                comparators,
            })
        }
    }

    /// Consumes a comparison operator if one is next
    fn comparison_operator(&mut self) -> Option<CmpOp> {
        let (op, width) = match (&self.current().kind, self.peek_kind(1)) {
            (TokenKind::EqEq, _) => (CmpOp::Eq, 1),
            (TokenKind::NotEq, _) => (CmpOp::NotEq, 1),
            (TokenKind::Lt, _) => (CmpOp::Lt, 1),
            (TokenKind::LtE, _) => (CmpOp::LtE, 1),
            (TokenKind::Gt, _) => (CmpOp::Gt, 1),
            (TokenKind::GtE, _) => (CmpOp::GtE, 1),
            (TokenKind::Keyword(Kw::In), _) => (CmpOp::In, 1),
            (TokenKind::Keyword(Kw::Not), Some(TokenKind::Keyword(Kw::In))) => (CmpOp::NotIn, 2),
            (TokenKind::Keyword(Kw::Is), Some(TokenKind::Keyword(Kw::Not))) => (CmpOp::IsNot, 2),
            (TokenKind::Keyword(Kw::Is), _) => (CmpOp::Is, 1),
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn parse_arith(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::DoubleSlash => BinOp::FloorDiv,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_power(),
        };
        self.advance();
        let operand = self.nested(Self::parse_factor)?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let mut base = self.parse_atom()?;

        loop {
            if self.eat(&TokenKind::LParen) {
                let (args, keywords) = self.parse_arguments()?;
                base = Expr::Call {
                    func: Box::new(base),
                    args,
                    keywords,
                };
            } else if self.eat(&TokenKind::LBracket) {
                let index = self.parse_test()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                base = Expr::Subscript {
                    value: Box::new(base),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        // Power is right associative and binds tighter than unary minus on its left
        if self.eat(&TokenKind::DoubleStar) {
            let exponent = self.parse_factor()?;
            return Ok(binary(base, BinOp::Pow, exponent));
        }
        Ok(base)
    }

    /// Parses call arguments after the opening parenthesis
    fn parse_arguments(&mut self) -> ParseResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let is_keyword = matches!(self.current().kind, TokenKind::Name(_))
                && self.peek_kind(1) == Some(&TokenKind::Assign);

            if is_keyword {
                let name = self.expect_name("keyword")?;
                self.advance();
                if keywords.iter().any(|k| k.name == name) {
                    return Err(SyntaxError::new(
                        self.file.clone(),
                        self.line(),
                        format!("keyword argument repeated: {name}"),
                    ));
                }
                let value = self.parse_test()?;
                keywords.push(Keyword { name, value });
            } else {
                if !keywords.is_empty() {
                    return Err(SyntaxError::new(
                        self.file.clone(),
                        self.line(),
                        "positional argument follows keyword argument",
                    ));
                }
                args.push(self.parse_test()?);
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok((args, keywords))
    }

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        let expr = match token.kind {
            TokenKind::Name(name) => Expr::Name(name),
            TokenKind::Int(v) => Expr::Constant(Constant::Int(v)),
            TokenKind::Float(v) => Expr::Constant(Constant::Float(v)),
            TokenKind::Str(mut s) => {
                // Adjacent literals concatenate
                while let TokenKind::Str(next) = &self.current().kind {
                    s.push_str(next);
                    self.pos += 1;
                }
                Expr::Constant(Constant::Str(s))
            }
            TokenKind::Keyword(Kw::True) => Expr::Constant(Constant::Bool(true)),
            TokenKind::Keyword(Kw::False) => Expr::Constant(Constant::Bool(false)),
            TokenKind::Keyword(Kw::None) => Expr::Constant(Constant::None),
            TokenKind::LParen => {
                if self.eat(&TokenKind::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.parse_test()?;
                if self.eat(&TokenKind::RParen) {
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.eat(&TokenKind::Comma) {
                    if self.check(&TokenKind::RParen) {
                        break;
                    }
                    items.push(self.parse_test()?);
                }
                self.expect(&TokenKind::RParen, "')'")?;
                Expr::Tuple(items)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    items.push(self.parse_test()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Expr::List(items)
            }
            other => {
                return Err(SyntaxError::new(
                    self.file.clone(),
                    token.line,
                    format!("expected expression, found {}", other.describe()),
                ));
            }
        };
        Ok(expr)
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    Expr::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
