//! Global namespaces

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

/// Name bindings that remember first-insertion order
#[derive(Debug, Default)]
pub struct Namespace {
    order: Vec<String>,
    values: HashMap<String, Value>,
}

impl Namespace {
    /// Look up a binding
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Bind or rebind; rebinding keeps the original position
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.values.insert(name, value);
    }

    /// Whether `name` is bound
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bindings in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }
}

/// A shared global namespace
///
/// Every loaded file executes in its own `Scope`; functions keep a handle to
/// the scope they were defined in.
#[derive(Debug, Clone, Default)]
pub struct Scope(Rc<RefCell<Namespace>>);

impl Scope {
    /// Create an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the value bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    /// Bind `name`
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().set(name, value);
    }

    /// Whether `name` is bound
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains(name)
    }

    /// Snapshot of all bindings in definition order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Whether two handles refer to the same namespace
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
