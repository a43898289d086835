//! Package loading seam for `require`

use crate::value::Value;
use indexmap::IndexMap;

/// Names a package exports, in export order
pub type Exports = IndexMap<String, Value>;

/// Resolves a package name to its exports
///
/// Implementations live outside the engine: they may read from disk, a
/// registry, or an in-process table. The engine only ever sees the result.
pub trait PackageLoader: Send + Sync {
    /// Exports of `package`, or `None` if it cannot be loaded
    fn load(&self, package: &str) -> Option<Exports>;
}

/// Loader that knows no packages
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackages;

impl PackageLoader for NoPackages {
    fn load(&self, _package: &str) -> Option<Exports> {
        None
    }
}

/// In-memory loader
#[derive(Debug, Clone, Default)]
pub struct MapLoader {
    packages: IndexMap<String, Exports>,
}

impl MapLoader {
    /// Create an empty loader
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, replacing any previous one with the same name
    #[must_use]
    pub fn with_package<I, S, V>(mut self, package: impl Into<String>, exports: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        self.insert(package, exports);
        self
    }

    /// Register a package in place
    pub fn insert<I, S, V>(&mut self, package: impl Into<String>, exports: I)
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let exports = exports
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self.packages.insert(package.into(), exports);
    }
}

impl PackageLoader for MapLoader {
    fn load(&self, package: &str) -> Option<Exports> {
        self.packages.get(package).cloned()
    }
}
