//! The caller's own top-level bindings

use en_namespace::Value;
use indexmap::IndexMap;

/// Bindings made directly in the global environment
///
/// Consulted before the search path, so a global definition shadows any
/// attached namespace.
#[derive(Debug, Clone, Default)]
pub struct GlobalEnv {
    bindings: IndexMap<String, Value>,
}

impl GlobalEnv {
    /// Create an empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous value
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.bindings.insert(name.into(), value.into())
    }

    /// Remove `name`, returning its value
    pub fn undefine(&mut self, name: &str) -> Option<Value> {
        self.bindings.shift_remove(name)
    }

    /// Value bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Whether `name` is bound
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Remove every binding
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
