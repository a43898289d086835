//! Binding storage
//!
//! [`WorkingTable`] is the mutable table a builder writes into. [`BindingTable`]
//! is what a sealed namespace owns: the same bindings in the same order, each
//! with its visibility tier fixed.

use crate::value::Value;
use en_visibility::{NamingConvention, ProvideList, Visibility, classify};
use indexmap::IndexMap;
use indexmap::map::Entry;

/// Table under construction
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkingTable {
    values: IndexMap<String, Value>,
}

impl WorkingTable {
    /// Bind unconditionally; last write for a name wins
    pub(crate) fn bind(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    /// Bind only if the name is still free
    ///
    /// Returns whether the binding was inserted.
    pub(crate) fn bind_default(&mut self, name: String, value: Value) -> bool {
        match self.values.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// A name, its value, and its tier
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) value: Value,
    pub(crate) visibility: Visibility,
}

/// Read-only table owned by a sealed namespace
#[derive(Debug, Clone, Default)]
pub(crate) struct BindingTable {
    bindings: IndexMap<String, Binding>,
}

impl BindingTable {
    /// Fix every binding's tier using the table's final contents
    pub(crate) fn classify(
        working: WorkingTable,
        provided: &ProvideList,
        convention: &NamingConvention,
    ) -> Self {
        let bindings = working
            .values
            .into_iter()
            .map(|(name, value)| {
                let visibility = classify(&name, provided, convention);
                (name, Binding { value, visibility })
            })
            .collect();
        Self { bindings }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings
            .iter()
            .map(|(name, binding)| (name.as_str(), binding))
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}
