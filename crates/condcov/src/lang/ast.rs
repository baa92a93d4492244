//! Syntax tree for the instrumented language
//!
//! Statements carry the 1-based source line they start on; conditional
//! sites are keyed by that line. Expressions carry no location.

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// Top-level statements in source order
    pub body: Vec<Stmt>,
}

impl Module {
    /// Create a module from its statements
    #[must_use]
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }

    /// Names of every top-level `def`, in source order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDef(def) => Some(def.name.as_str()),
            _ => None,
        })
    }
}

/// A statement with its source line
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// Line the statement starts on
    pub line: usize,
    /// Statement payload
    pub kind: StmtKind,
}

impl Stmt {
    /// Create a statement at `line`
    #[must_use]
    pub fn new(line: usize, kind: StmtKind) -> Self {
        Self { line, kind }
    }

    /// Create an expression statement
    #[must_use]
    pub fn expr(line: usize, expr: Expr) -> Self {
        Self::new(line, StmtKind::Expr(expr))
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Bare expression, evaluated for its effect
    Expr(Expr),
    /// `name = value`
    Assign {
        /// Bound name
        target: String,
        /// Assigned value
        value: Expr,
    },
    /// `name op= value`
    AugAssign {
        /// Updated name
        target: String,
        /// Arithmetic operator
        op: BinOp,
        /// Right-hand side
        value: Expr,
    },
    /// `def name(params): body`
    FunctionDef(FunctionDef),
    /// `return [value]`
    Return(Option<Expr>),
    /// `if test: body [elif ...] [else: orelse]`
    ///
    /// An `elif` is a nested `If` that is the only statement of `orelse`.
    If {
        /// Branch condition
        test: Expr,
        /// Taken branch
        body: Vec<Stmt>,
        /// Else branch, possibly a single nested `If` for `elif`
        orelse: Vec<Stmt>,
    },
    /// `while test: body`
    While {
        /// Loop condition
        test: Expr,
        /// Loop body
        body: Vec<Stmt>,
    },
    /// `for target in iter: body`
    For {
        /// Loop variable
        target: String,
        /// Iterated expression
        iter: Expr,
        /// Loop body
        body: Vec<Stmt>,
    },
    /// `assert test[, msg]`
    Assert {
        /// Asserted condition
        test: Expr,
        /// Optional failure message
        msg: Option<Expr>,
    },
    /// `import module [as alias]`
    Import {
        /// Dotted module path
        module: String,
        /// Local alias
        alias: Option<String>,
    },
    /// `from module import a [as b], ...`
    ImportFrom {
        /// Dotted module path
        module: String,
        /// Imported names
        names: Vec<ImportName>,
    },
    /// `pass`
    Pass,
    /// `break`
    Break,
    /// `continue`
    Continue,
}

/// One name in a `from ... import` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    /// Imported symbol
    pub name: String,
    /// Local alias
    pub alias: Option<String>,
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Declared name
    pub name: String,
    /// Positional parameters
    pub params: Vec<Param>,
    /// Function body
    pub body: Vec<Stmt>,
}

impl FunctionDef {
    /// Create a zero-argument function
    #[must_use]
    pub fn nullary(name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            body,
        }
    }
}

/// A function parameter with an optional default
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Default value expression, evaluated at definition time
    pub default: Option<Expr>,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier reference
    Name(String),
    /// Literal
    Constant(Constant),
    /// n-ary `and` / `or`
    BoolOp {
        /// Combinator
        op: BoolOp,
        /// Operands, at least two
        values: Vec<Expr>,
    },
    /// `not x`, `-x`, `+x`
    UnaryOp {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// Arithmetic
    BinOp {
        /// Left operand
        left: Box<Expr>,
        /// Operator
        op: BinOp,
        /// Right operand
        right: Box<Expr>,
    },
    /// Possibly chained comparison: `a < b <= c`
    Compare {
        /// First operand
        left: Box<Expr>,
        /// Operators, one per comparator
        ops: Vec<CmpOp>,
        /// Remaining operands
        comparators: Vec<Expr>,
    },
    /// `func(args, key=value)`
    Call {
        /// Callee
        func: Box<Expr>,
        /// Positional arguments
        args: Vec<Expr>,
        /// Keyword arguments
        keywords: Vec<Keyword>,
    },
    /// `[a, b]`
    List(Vec<Expr>),
    /// `(a, b)`
    Tuple(Vec<Expr>),
    /// `value[index]`
    Subscript {
        /// Indexed value
        value: Box<Expr>,
        /// Index
        index: Box<Expr>,
    },
    /// `body if test else orelse`
    IfExp {
        /// Condition
        test: Box<Expr>,
        /// Value when true
        body: Box<Expr>,
        /// Value when false
        orelse: Box<Expr>,
    },
}

impl Expr {
    /// Identifier reference
    #[must_use]
    pub fn name(id: impl Into<String>) -> Self {
        Self::Name(id.into())
    }

    /// String literal
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Constant(Constant::Str(value.into()))
    }

    /// Integer literal
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Constant(Constant::Int(value))
    }

    /// Positional-only call of a named function
    #[must_use]
    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            func: Box::new(Self::name(func)),
            args,
            keywords: Vec::new(),
        }
    }

    /// Callee name when this is a call of a bare identifier
    #[must_use]
    pub fn called_name(&self) -> Option<&str> {
        match self {
            Self::Call { func, .. } => match func.as_ref() {
                Self::Name(id) => Some(id),
                _ => None,
            },
            _ => None,
        }
    }
}

/// `key=value` in a call
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    /// Parameter name
    pub name: String,
    /// Argument value
    pub value: Expr,
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
}

/// Boolean combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

impl BoolOp {
    /// Source keyword
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `not`
    Not,
    /// `-`
    Neg,
    /// `+`
    Pos,
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
}

impl BinOp {
    /// Source symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtE,
    /// `>`
    Gt,
    /// `>=`
    GtE,
    /// `in`
    In,
    /// `not in`
    NotIn,
    /// `is`
    Is,
    /// `is not`
    IsNot,
}

impl CmpOp {
    /// Source symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }
}
