//! Name resolution across the global environment and the search path
//!
//! Two contexts exist. Code running inside a namespace resolves through that
//! namespace's [`InternalAccessor`] and sees every tier of its own bindings
//! but nothing global. Top-level code resolves through its own bindings
//! first and then each attached namespace, front to back, using the external
//! path only.

use crate::global::GlobalEnv;
use crate::search_path::SearchPath;
use en_namespace::{
    BuildContext, Exports, InternalAccessor, NameNotFoundError, NoPackages, PackageLoader, Value,
};

/// Where a lookup originates
#[derive(Debug, Clone, Copy)]
pub enum ResolutionContext<'scope> {
    /// Inside a namespace, through its accessor
    Internal(&'scope InternalAccessor),
    /// Top level
    Global,
}

/// Resolves unqualified names against a search path
///
/// Also serves as the [`BuildContext`] for namespaces built at top level:
/// a named `refer` resolves the way a global lookup would.
pub struct Resolver<'env> {
    search_path: &'env SearchPath,
    globals: Option<&'env GlobalEnv>,
    loader: &'env dyn PackageLoader,
}

impl<'env> Resolver<'env> {
    /// Resolver over `search_path` with no global bindings and no packages
    #[must_use]
    pub fn new(search_path: &'env SearchPath) -> Self {
        Self {
            search_path,
            globals: None,
            loader: &NoPackages,
        }
    }

    /// Consult `globals` before the search path
    #[must_use]
    pub const fn with_globals(mut self, globals: &'env GlobalEnv) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Load required packages through `loader`
    #[must_use]
    pub fn with_loader(mut self, loader: &'env dyn PackageLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Resolve `name` from `context`
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if nothing visible from `context` binds
    /// the name.
    pub fn resolve(
        &self,
        name: &str,
        context: ResolutionContext<'_>,
    ) -> Result<Value, NameNotFoundError> {
        match context {
            ResolutionContext::Internal(accessor) => accessor.get(name),
            ResolutionContext::Global => self.resolve_global(name),
        }
    }

    /// Resolve `name` as top-level code would
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if neither the global bindings nor any
    /// attached namespace export the name.
    pub fn resolve_global(&self, name: &str) -> Result<Value, NameNotFoundError> {
        if let Some(value) = self.globals.and_then(|globals| globals.get(name)) {
            return Ok(value.clone());
        }
        let resolved = self.search_path.resolve(name);
        if resolved.is_err() {
            tracing::debug!(name, "global lookup failed");
        }
        resolved
    }
}

impl BuildContext for Resolver<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.resolve_global(name).ok()
    }

    fn load_package(&self, package: &str) -> Option<Exports> {
        self.loader.load(package)
    }
}
