//! Tree-walking evaluator

use std::collections::HashMap;
use std::rc::Rc;

use super::builtins;
use super::exception::Exception;
use super::ops;
use super::scope::Scope;
use super::value::{Function, Value};
use crate::lang::{BinOp, BoolOp, Expr, Module, Stmt, StmtKind};

/// Default limit on nested user-function calls
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// How a block finished
#[derive(Debug)]
enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Name resolution context for one activation
struct Frame<'s> {
    globals: &'s Scope,
    /// `None` at module level, where bindings go to the globals
    locals: Option<HashMap<String, Value>>,
}

impl Frame<'_> {
    fn set(&mut self, name: &str, value: Value) {
        match &mut self.locals {
            Some(locals) => {
                locals.insert(name.to_string(), value);
            }
            None => self.globals.set(name, value),
        }
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.locals
            .as_ref()
            .and_then(|locals| locals.get(name).cloned())
            .or_else(|| self.globals.get(name))
    }
}

/// Executes modules and calls functions
///
/// One interpreter can serve many scopes; it holds only the builtins and the
/// current call depth.
pub struct Interpreter {
    builtins: HashMap<&'static str, Value>,
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    /// Create an interpreter with the standard builtins
    #[must_use]
    pub fn new() -> Self {
        Self {
            builtins: builtins::table(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the call depth limit
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Run every top-level statement of `module` with `scope` as globals
    pub fn exec_module(&mut self, module: &Module, scope: &Scope) -> Result<(), Exception> {
        let mut frame = Frame {
            globals: scope,
            locals: None,
        };
        match self.exec_block(&module.body, &mut frame)? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => Err(Exception::Syntax("'return' outside function".into())),
            Flow::Break | Flow::Continue => {
                Err(Exception::Syntax("loop control outside loop".into()))
            }
        }
    }

    /// Call any callable value with positional and keyword arguments
    pub fn call(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, Exception> {
        match callee {
            Value::Function(func) => self.call_function(func, args, kwargs),
            Value::Native(native) => {
                if !kwargs.is_empty() {
                    return Err(Exception::type_error(format!(
                        "{}() takes no keyword arguments",
                        native.name
                    )));
                }
                native.invoke(&args)
            }
            other => Err(Exception::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_function(
        &mut self,
        func: &Rc<Function>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value, Exception> {
        if self.depth >= self.max_depth {
            return Err(Exception::Recursion(self.max_depth));
        }
        let locals = bind_arguments(func, args, kwargs)?;
        let mut frame = Frame {
            globals: &func.globals,
            locals: Some(locals),
        };
        self.depth += 1;
        let flow = self.exec_block(&func.def.body, &mut frame);
        self.depth -= 1;
        match flow? {
            Flow::Normal => Ok(Value::None),
            Flow::Return(value) => Ok(value),
            Flow::Break | Flow::Continue => {
                Err(Exception::Syntax("loop control outside loop".into()))
            }
        }
    }

    fn exec_block(&mut self, body: &[Stmt], frame: &mut Frame<'_>) -> Result<Flow, Exception> {
        for stmt in body {
            match self.exec_stmt(stmt, frame)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, frame: &mut Frame<'_>) -> Result<Flow, Exception> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr, frame)?;
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval(value, frame)?;
                frame.set(target, value);
            }
            StmtKind::AugAssign { target, op, value } => {
                let current = self.lookup(target, frame)?;
                let rhs = self.eval(value, frame)?;
                let updated = match (&current, op, &rhs) {
                    // `+=` on a list extends it in place
                    (Value::List(items), BinOp::Add, Value::List(extra)) => {
                        let extra = extra.borrow().clone();
                        items.borrow_mut().extend(extra);
                        current.clone()
                    }
                    _ => ops::binary(*op, &current, &rhs)?,
                };
                frame.set(target, updated);
            }
            StmtKind::FunctionDef(def) => {
                let mut defaults = Vec::with_capacity(def.params.len());
                for param in &def.params {
                    defaults.push(match &param.default {
                        Some(expr) => Some(self.eval(expr, frame)?),
                        None => None,
                    });
                }
                let func = Function {
                    def: Rc::new(def.clone()),
                    globals: frame.globals.clone(),
                    defaults,
                };
                frame.set(&def.name, Value::Function(Rc::new(func)));
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, frame)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::If { test, body, orelse } => {
                let branch = if self.eval(test, frame)?.is_truthy() {
                    body
                } else {
                    orelse
                };
                return self.exec_block(branch, frame);
            }
            StmtKind::While { test, body } => {
                while self.eval(test, frame)?.is_truthy() {
                    match self.exec_block(body, frame)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            StmtKind::For { target, iter, body } => {
                for item in self.eval(iter, frame)?.iter_values()? {
                    frame.set(target, item);
                    match self.exec_block(body, frame)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
            }
            StmtKind::Assert { test, msg } => {
                if !self.eval(test, frame)?.is_truthy() {
                    let message = match msg {
                        Some(expr) => Some(self.eval(expr, frame)?.to_string()),
                        None => None,
                    };
                    return Err(Exception::Assertion {
                        message,
                        line: stmt.line,
                    });
                }
            }
            StmtKind::Import { module, .. } | StmtKind::ImportFrom { module, .. } => {
                return Err(Exception::Import(format!("No module named '{module}'")));
            }
            StmtKind::Pass => {}
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    fn lookup(&self, name: &str, frame: &Frame<'_>) -> Result<Value, Exception> {
        frame
            .get(name)
            .or_else(|| self.builtins.get(name).cloned())
            .ok_or_else(|| Exception::Name(name.to_string()))
    }

    fn eval(&mut self, expr: &Expr, frame: &Frame<'_>) -> Result<Value, Exception> {
        match expr {
            Expr::Name(id) => self.lookup(id, frame),
            Expr::Constant(constant) => Ok(Value::from(constant)),
            Expr::BoolOp { op, values } => {
                let mut last = Value::None;
                for value in values {
                    last = self.eval(value, frame)?;
                    let short_circuit = match op {
                        BoolOp::And => !last.is_truthy(),
                        BoolOp::Or => last.is_truthy(),
                    };
                    if short_circuit {
                        break;
                    }
                }
                Ok(last)
            }
            Expr::UnaryOp { op, operand } => {
                let operand = self.eval(operand, frame)?;
                ops::unary(*op, &operand)
            }
            Expr::BinOp { left, op, right } => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Compare {
                left,
                ops: operators,
                comparators,
            } => {
                let mut lhs = self.eval(left, frame)?;
                for (op, comparator) in operators.iter().zip(comparators) {
                    let rhs = self.eval(comparator, frame)?;
                    if !ops::compare(*op, &lhs, &rhs)? {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                let callee = self.eval(func, frame)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, frame)?);
                }
                let mut kwargs = Vec::with_capacity(keywords.len());
                for kw in keywords {
                    kwargs.push((kw.name.clone(), self.eval(&kw.value, frame)?));
                }
                self.call(&callee, values, kwargs)
            }
            Expr::List(items) => Ok(Value::list(self.eval_all(items, frame)?)),
            Expr::Tuple(items) => Ok(Value::tuple(self.eval_all(items, frame)?)),
            Expr::Subscript { value, index } => {
                let value = self.eval(value, frame)?;
                let index = self.eval(index, frame)?;
                ops::subscript(&value, &index)
            }
            Expr::IfExp { test, body, orelse } => {
                if self.eval(test, frame)?.is_truthy() {
                    self.eval(body, frame)
                } else {
                    self.eval(orelse, frame)
                }
            }
        }
    }

    fn eval_all(&mut self, items: &[Expr], frame: &Frame<'_>) -> Result<Vec<Value>, Exception> {
        items.iter().map(|item| self.eval(item, frame)).collect()
    }
}

fn bind_arguments(
    func: &Function,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> Result<HashMap<String, Value>, Exception> {
    let params = &func.def.params;
    let name = func.name();
    if args.len() > params.len() {
        return Err(Exception::type_error(format!(
            "{name}() takes {} positional argument(s) but {} were given",
            params.len(),
            args.len()
        )));
    }
    let mut slots: Vec<Option<Value>> = args.into_iter().map(Some).collect();
    slots.resize(params.len(), None);
    for (key, value) in kwargs {
        let Some(position) = params.iter().position(|p| p.name == key) else {
            return Err(Exception::type_error(format!(
                "{name}() got an unexpected keyword argument '{key}'"
            )));
        };
        if slots[position].is_some() {
            return Err(Exception::type_error(format!(
                "{name}() got multiple values for argument '{key}'"
            )));
        }
        slots[position] = Some(value);
    }
    let mut locals = HashMap::with_capacity(params.len());
    for ((param, slot), default) in params.iter().zip(slots).zip(&func.defaults) {
        let value = slot.or_else(|| default.clone()).ok_or_else(|| {
            Exception::type_error(format!(
                "{name}() missing required argument: '{}'",
                param.name
            ))
        })?;
        locals.insert(param.name.clone(), value);
    }
    Ok(locals)
}
