//! Runtime values

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

use super::exception::Exception;
use super::scope::Scope;
use crate::lang::{float_repr, str_repr, Constant, FunctionDef};

/// Signature of a builtin or host-provided function
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, Exception>;

/// A value produced by evaluating an expression
#[derive(Clone)]
pub enum Value {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Machine integer; arithmetic is checked
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Mutable, shared list
    List(Rc<RefCell<Vec<Value>>>),
    /// Immutable tuple
    Tuple(Rc<[Value]>),
    /// User-defined function
    Function(Rc<Function>),
    /// Function implemented on the host side
    Native(Rc<NativeFunction>),
}

/// A `def` bound to the scope it was defined in
pub struct Function {
    /// Parsed definition
    pub def: Rc<FunctionDef>,
    /// Global namespace the body resolves free names in
    pub globals: Scope,
    /// Evaluated default per parameter
    pub defaults: Vec<Option<Value>>,
}

impl Function {
    /// Declared name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

// Printing the globals would recurse through the function itself.
impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.def.name)
            .field("params", &self.def.params.len())
            .finish_non_exhaustive()
    }
}

/// A named host closure callable from interpreted code
pub struct NativeFunction {
    /// Name shown in errors and reprs
    pub name: String,
    func: Box<NativeFn>,
}

impl NativeFunction {
    /// Wrap a closure
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Exception> + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Invoke with positional arguments
    pub fn invoke(&self, args: &[Value]) -> Result<Value, Exception> {
        (self.func)(args)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Numeric view of a value, with `bool` promoted to `int`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => i as f64,
            Self::Float(x) => x,
        }
    }
}

impl Value {
    /// Build a string value
    #[must_use]
    pub fn str(s: impl AsRef<str>) -> Self {
        Self::Str(Rc::from(s.as_ref()))
    }

    /// Build a fresh list value
    #[must_use]
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Build a tuple value
    #[must_use]
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(Rc::from(items))
    }

    /// Wrap a host closure as a callable value
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Self]) -> Result<Self, Exception> + 'static,
    {
        Self::Native(Rc::new(NativeFunction::new(name, func)))
    }

    /// Type name as the language reports it
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Function(_) => "function",
            Self::Native(_) => "builtin_function_or_method",
        }
    }

    /// Truth value used by `if`, `while`, `and`, `or`, `not` and `assert`
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(x) => *x != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.borrow().is_empty(),
            Self::Tuple(items) => !items.is_empty(),
            Self::Function(_) | Self::Native(_) => true,
        }
    }

    /// True for user and native functions
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Native(_))
    }

    pub(crate) const fn as_num(&self) -> Option<Num> {
        match self {
            Self::Bool(b) => Some(Num::Int(*b as i64)),
            Self::Int(i) => Some(Num::Int(*i)),
            Self::Float(x) => Some(Num::Float(*x)),
            _ => None,
        }
    }

    /// Integer view, accepting `bool`
    pub(crate) const fn as_index(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(*b as i64),
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Elements of an iterable value, snapshotted
    pub fn iter_values(&self) -> Result<Vec<Self>, Exception> {
        match self {
            Self::List(items) => Ok(items.borrow().clone()),
            Self::Tuple(items) => Ok(items.to_vec()),
            Self::Str(s) => Ok(s.chars().map(|c| Self::str(c.to_string())).collect()),
            other => Err(Exception::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// Value equality (`==`)
    #[must_use]
    pub fn py_eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return match (a, b) {
                (Num::Int(a), Num::Int(b)) => a == b,
                (a, b) => a.as_f64() == b.as_f64(),
            };
        }
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                Rc::ptr_eq(a, b) || seq_eq(&a.borrow(), &b.borrow())
            }
            (Self::Tuple(a), Self::Tuple(b)) => seq_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`; `None` when the types do not order
    #[must_use]
    pub fn py_cmp(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return match (a, b) {
                (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
                (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
            };
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => seq_cmp(&a.borrow(), &b.borrow()),
            (Self::Tuple(a), Self::Tuple(b)) => seq_cmp(a, b),
            _ => None,
        }
    }

    /// Identity (`is`)
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Tuple(a), Self::Tuple(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Source-like rendering, as `repr()` would produce
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => str_repr(s),
            other => other.to_string(),
        }
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
}

fn seq_cmp(a: &[Value], b: &[Value]) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b) {
        if !x.py_eq(y) {
            return x.py_cmp(y);
        }
    }
    Some(a.len().cmp(&b.len()))
}

/// `str()` rendering
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&float_repr(*x)),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                write_reprs(f, &items.borrow())?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_reprs(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::Function(func) => write!(f, "<function {}>", func.name()),
            Self::Native(native) => write!(f, "<built-in function {}>", native.name),
        }
    }
}

fn write_reprs(f: &mut Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&item.repr())?;
    }
    Ok(())
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.py_eq(other)
    }
}

impl From<&Constant> for Value {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::None => Self::None,
            Constant::Bool(b) => Self::Bool(*b),
            Constant::Int(i) => Self::Int(*i),
            Constant::Float(x) => Self::Float(*x),
            Constant::Str(s) => Self::str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::str(s)
    }
}
