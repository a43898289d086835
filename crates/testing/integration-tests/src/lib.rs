//! Integration test utilities for the Enclave engine

use anyhow::{Context, Result};
use en_driver::{Engine, EngineConfig};
use en_namespace::{Directive, Namespace};
use std::path::{Path, PathBuf};

/// Test fixture helper
pub struct TestFixture {
    /// Engine under test
    pub engine: Engine,
}

impl TestFixture {
    /// Creates a fixture with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: Engine::default(),
        }
    }

    /// Creates a fixture from TOML configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_config(toml: &str) -> Result<Self> {
        let config = EngineConfig::from_toml_str(toml).context("parsing fixture config")?;
        Ok(Self {
            engine: Engine::new(config)?,
        })
    }

    /// Creates a fixture from a file under `fixtures/`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded
    pub fn from_fixture(name: &str) -> Result<Self> {
        let path = fixture_path(name);
        let engine = Engine::from_file(&path)
            .with_context(|| format!("loading fixture {}", path.display()))?;
        Ok(Self { engine })
    }

    /// Builds a labeled namespace of integer bindings
    ///
    /// # Errors
    ///
    /// Returns an error if construction fails
    pub fn module(&self, label: &str, bindings: &[(&str, i64)]) -> Result<Namespace> {
        let directives = bindings
            .iter()
            .map(|(name, value)| Directive::bind(*name, *value));
        Ok(self.engine.build_labeled(label, directives)?)
    }

    /// Builds a namespace of integer bindings and attaches it under its label
    ///
    /// # Errors
    ///
    /// Returns an error if construction fails
    pub fn attach(&self, label: &str, bindings: &[(&str, i64)]) -> Result<Namespace> {
        let namespace = self.module(label, bindings)?;
        self.engine.use_global(label, namespace.clone());
        Ok(namespace)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute path of a file under `fixtures/`
#[must_use]
pub fn fixture_path(name: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}
