//! Engine facade
//!
//! Owns one search path, the global bindings, and the package loader, so
//! independent engines never share state.

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use en_namespace::{
    BuildError, CallError, Directive, NameNotFoundError, Namespace, NamespaceBuilder,
    NamingConvention, NoPackages, PackageLoader, Value,
};
use en_search::{EntryContents, GlobalEnv, NotAttachedError, Resolver, SearchPath};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Namespace engine
pub struct Engine {
    config: EngineConfig,
    convention: NamingConvention,
    search_path: SearchPath,
    globals: RwLock<GlobalEnv>,
    loader: Arc<dyn PackageLoader>,
}

impl Engine {
    /// Create an engine from validated configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Create an engine from a TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the file cannot be loaded.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Ok(Self::new(EngineConfig::from_file(path)?)?)
    }

    fn with_config(config: EngineConfig) -> Self {
        Self {
            convention: config.visibility.convention(),
            config,
            search_path: SearchPath::new(),
            globals: RwLock::new(GlobalEnv::new()),
            loader: Arc::new(NoPackages),
        }
    }

    /// Resolve `require` through `loader`
    #[must_use]
    pub fn with_loader(mut self, loader: impl PackageLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The engine's search path
    #[must_use]
    pub const fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Build an unlabeled namespace
    ///
    /// Named refers resolve the way [`resolve_global`](Self::resolve_global)
    /// would at the moment the build starts.
    ///
    /// # Errors
    ///
    /// Returns `BuildError` on the first failing directive.
    pub fn build_namespace<I>(&self, directives: I) -> Result<Namespace, BuildError>
    where
        I: IntoIterator<Item = Directive>,
    {
        let globals = self.read_globals().clone();
        let resolver = self.resolver(&globals);
        NamespaceBuilder::new(&resolver)
            .with_convention(self.convention)
            .run(directives)
    }

    /// Build a labeled namespace
    ///
    /// # Errors
    ///
    /// Returns `BuildError` on the first failing directive.
    pub fn build_labeled<I>(
        &self,
        label: impl Into<String>,
        directives: I,
    ) -> Result<Namespace, BuildError>
    where
        I: IntoIterator<Item = Directive>,
    {
        let globals = self.read_globals().clone();
        let resolver = self.resolver(&globals);
        NamespaceBuilder::labeled(&resolver, label)
            .with_convention(self.convention)
            .run(directives)
    }

    /// Bind a global name, returning the previous value
    pub fn define_global(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write_globals().define(name, value)
    }

    /// Remove a global name, returning its value
    pub fn undefine_global(&self, name: &str) -> Option<Value> {
        self.write_globals().undefine(name)
    }

    /// Attach `namespace` to the search path under `label`
    ///
    /// Returns the namespace previously attached under that label.
    pub fn use_global(&self, label: impl Into<String>, namespace: Namespace) -> Option<Namespace> {
        self.search_path.attach(label, namespace)
    }

    /// Detach the namespace attached under `label`
    ///
    /// With `strict_drop` disabled an unknown label only logs a warning and
    /// yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `NotAttachedError` if the label is unknown and `strict_drop`
    /// is enabled.
    pub fn drop_global(&self, label: &str) -> Result<Option<Namespace>, NotAttachedError> {
        match self.search_path.detach(label) {
            Ok(namespace) => Ok(Some(namespace)),
            Err(_) if !self.config.search_path.strict_drop => {
                tracing::warn!(label, "drop of a label that is not attached");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Resolve an unqualified name from top level
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if neither the global bindings nor any
    /// attached namespace export the name.
    pub fn resolve_global(&self, name: &str) -> Result<Value, NameNotFoundError> {
        let globals = self.read_globals();
        self.resolver(&globals).resolve_global(name)
    }

    /// Resolve a function from top level and invoke it
    ///
    /// # Errors
    ///
    /// Returns `CallError` if the name is unbound, not a function, or the
    /// call fails.
    pub fn call_global(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let value = self.resolve_global(name)?;
        let function = value.as_function().ok_or_else(|| CallError::NotCallable {
            name: name.to_string(),
            kind: value.kind(),
        })?;
        function.call(args)
    }

    /// Attached labels with their listed names, front to back
    #[must_use]
    pub fn search_path_contents(&self, include_hidden: bool) -> Vec<EntryContents> {
        self.search_path.contents(include_hidden)
    }

    /// Detach every namespace and clear the global bindings
    pub fn reset(&self) {
        self.search_path.reset();
        self.write_globals().clear();
    }

    fn resolver<'env>(&'env self, globals: &'env GlobalEnv) -> Resolver<'env> {
        Resolver::new(&self.search_path)
            .with_globals(globals)
            .with_loader(self.loader.as_ref())
    }

    fn read_globals(&self) -> RwLockReadGuard<'_, GlobalEnv> {
        self.globals.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_globals(&self) -> RwLockWriteGuard<'_, GlobalEnv> {
        self.globals.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}
