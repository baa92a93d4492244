//! Isolated execution engine
//!
//! A small tree-walking interpreter for parsed [`Module`](crate::lang::Module)s.
//! Each loaded file runs in its own [`Scope`], so the instrumented target and
//! every test file see only what is bound into them explicitly. Host code
//! plugs in through [`Value::native`] closures.

mod builtins;
mod eval;
mod exception;
mod ops;
mod scope;
mod value;

pub use eval::{Interpreter, DEFAULT_MAX_DEPTH};
pub use exception::Exception;
pub use scope::{Namespace, Scope};
pub use value::{Function, NativeFn, NativeFunction, Value};
