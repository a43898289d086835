//! Construction scope shared between a builder and the functions it creates
//!
//! A scope starts `Open`, holding the working table. Finalizing the builder
//! moves it to `Sealed`, where it points weakly at the namespace that now owns
//! the bindings. A builder dropped before finalizing leaves it `Abandoned`.

use crate::error::{CallError, ImmutableNamespaceError, NameNotFoundError};
use crate::namespace::{Namespace, NamespaceInner};
use crate::table::WorkingTable;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Label used in messages for namespaces built without one
pub(crate) const ANONYMOUS: &str = "<anonymous>";

pub(crate) enum ScopeState {
    Open(WorkingTable),
    Sealed(Weak<NamespaceInner>),
    Abandoned,
}

pub(crate) struct Scope {
    label: Option<String>,
    state: RwLock<ScopeState>,
}

impl Scope {
    pub(crate) fn open(label: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            label,
            state: RwLock::new(ScopeState::Open(WorkingTable::default())),
        })
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn display_label(&self) -> &str {
        self.label().unwrap_or(ANONYMOUS)
    }

    // Every critical section leaves the state consistent, so a poisoned lock
    // still holds usable data.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ScopeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ScopeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Full-access view of one namespace
///
/// Captured by every function defined while that namespace was being built.
/// Reads see bindings of all tiers. Writes are accepted only until the
/// namespace is sealed.
#[derive(Clone)]
pub struct InternalAccessor {
    scope: Arc<Scope>,
}

impl InternalAccessor {
    pub(crate) const fn new(scope: Arc<Scope>) -> Self {
        Self { scope }
    }

    /// Accessor that belongs to no namespace and resolves nothing
    #[must_use]
    pub fn detached() -> Self {
        Self {
            scope: Arc::new(Scope {
                label: None,
                state: RwLock::new(ScopeState::Abandoned),
            }),
        }
    }

    /// Label of the namespace this accessor belongs to
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.scope.label()
    }

    /// Whether the owning namespace has been sealed
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(*self.scope.read(), ScopeState::Sealed(_))
    }

    /// The sealed namespace, if it is still alive
    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        match &*self.scope.read() {
            ScopeState::Sealed(inner) => inner.upgrade().map(Namespace::from_inner),
            ScopeState::Open(_) | ScopeState::Abandoned => None,
        }
    }

    /// Read a binding of any tier
    ///
    /// Once sealed, functions read here are pinned to the namespace so they
    /// keep working after the caller lets go of it.
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if the namespace has no such binding.
    pub fn get(&self, name: &str) -> Result<Value, NameNotFoundError> {
        let sealed = match &*self.scope.read() {
            ScopeState::Open(table) => {
                return table.get(name).cloned().ok_or_else(|| NameNotFoundError::new(name));
            }
            ScopeState::Sealed(inner) => inner.upgrade(),
            ScopeState::Abandoned => None,
        };
        let owner = sealed.map(Namespace::from_inner);
        owner
            .as_ref()
            .and_then(|owner| {
                owner
                    .inner()
                    .table
                    .get(name)
                    .map(|binding| binding.value.clone().anchored_to(owner))
            })
            .ok_or_else(|| NameNotFoundError::new(name))
    }

    /// Whether a binding of any tier exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match &*self.scope.read() {
            ScopeState::Open(table) => table.contains(name),
            ScopeState::Sealed(inner) => inner
                .upgrade()
                .is_some_and(|inner| inner.table.get(name).is_some()),
            ScopeState::Abandoned => false,
        }
    }

    /// Every binding name, all tiers, in table order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        match &*self.scope.read() {
            ScopeState::Open(table) => table.names().map(str::to_string).collect(),
            ScopeState::Sealed(inner) => inner.upgrade().map_or_else(Vec::new, |inner| {
                inner.table.iter().map(|(name, _)| name.to_string()).collect()
            }),
            ScopeState::Abandoned => Vec::new(),
        }
    }

    /// Bind a name from inside the namespace
    ///
    /// # Errors
    ///
    /// Returns `ImmutableNamespaceError` once construction has finished.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), ImmutableNamespaceError> {
        match &mut *self.scope.write() {
            ScopeState::Open(table) => {
                table.bind(name.to_string(), value);
                Ok(())
            }
            ScopeState::Sealed(_) | ScopeState::Abandoned => Err(ImmutableNamespaceError {
                namespace: self.scope.display_label().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Look up a function of any tier and invoke it
    ///
    /// # Errors
    ///
    /// Fails if the name is absent or not a function, or if the call fails.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        match self.get(name)? {
            Value::Function(function) => function.call(args),
            other => Err(CallError::NotCallable {
                name: name.to_string(),
                kind: other.kind(),
            }),
        }
    }

    pub(crate) fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }
}

impl fmt::Debug for InternalAccessor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.scope.read() {
            ScopeState::Open(_) => "open",
            ScopeState::Sealed(_) => "sealed",
            ScopeState::Abandoned => "abandoned",
        };
        formatter
            .debug_struct("InternalAccessor")
            .field("namespace", &self.scope.display_label())
            .field("state", &state)
            .finish()
    }
}
