//! Runtime exceptions raised by interpreted code

use thiserror::Error;

/// An exception raised while executing a module or calling a function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Exception {
    /// `assert` evaluated to a falsy value
    #[error("AssertionError{}", message_suffix(.message))]
    Assertion {
        /// Rendered assertion message, if one was given
        message: Option<String>,
        /// Line of the failing `assert`
        line: usize,
    },

    /// Unbound identifier
    #[error("NameError: name '{0}' is not defined")]
    Name(String),

    /// Operation applied to a value of the wrong type
    #[error("TypeError: {0}")]
    Type(String),

    /// Right type, unacceptable value
    #[error("ValueError: {0}")]
    Value(String),

    /// Division or modulo by zero
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),

    /// Sequence index out of range
    #[error("IndexError: {0}")]
    Index(String),

    /// Integer result does not fit
    #[error("OverflowError: {0}")]
    Overflow(String),

    /// Sequence would exceed the allocation cap
    #[error("MemoryError: {0}")]
    Memory(String),

    /// `import` of a module that does not exist
    #[error("ImportError: {0}")]
    Import(String),

    /// Call depth limit reached
    #[error("RecursionError: maximum call depth of {0} exceeded")]
    Recursion(usize),

    /// Statement used where it is not allowed (`return` at module level, ...)
    #[error("SyntaxError: {0}")]
    Syntax(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl Exception {
    /// Create a type error
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    /// Create a value error
    #[must_use]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    /// True for a failed `assert`
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }

    /// Exception class name, e.g. `"TypeError"`
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Assertion { .. } => "AssertionError",
            Self::Name(_) => "NameError",
            Self::Type(_) => "TypeError",
            Self::Value(_) => "ValueError",
            Self::ZeroDivision(_) => "ZeroDivisionError",
            Self::Index(_) => "IndexError",
            Self::Overflow(_) => "OverflowError",
            Self::Memory(_) => "MemoryError",
            Self::Import(_) => "ImportError",
            Self::Recursion(_) => "RecursionError",
            Self::Syntax(_) => "SyntaxError",
        }
    }
}
