//! Engine configuration
//!
//! Read from TOML. Every section and field is optional:
//!
//! ```toml
//! [visibility]
//! marker = "."
//!
//! [search_path]
//! strict_drop = true
//!
//! [logging]
//! filter = "info"
//! ```

use crate::error::ConfigError;
use en_namespace::NamingConvention;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Naming convention settings
    pub visibility: VisibilityConfig,

    /// Search path behavior
    pub search_path: SearchPathConfig,

    /// Log output
    pub logging: LoggingConfig,
}

/// Naming convention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisibilityConfig {
    /// Reserved prefix character; one marks a name hidden, two mark it private
    pub marker: char,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            marker: NamingConvention::default().marker(),
        }
    }
}

impl VisibilityConfig {
    /// Convention described by this section
    #[must_use]
    pub const fn convention(&self) -> NamingConvention {
        NamingConvention::new(self.marker)
    }
}

/// Search path behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchPathConfig {
    /// Whether detaching an unknown label is an error rather than a warning
    pub strict_drop: bool,
}

impl Default for SearchPathConfig {
    fn default() -> Self {
        Self { strict_drop: true }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, is not valid TOML
    /// for this schema, or names an unusable marker.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not valid for this schema or
    /// names an unusable marker.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that the schema alone cannot
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMarker` if the marker could start an
    /// ordinary name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marker = self.visibility.marker;
        if marker.is_alphanumeric() || marker.is_whitespace() || marker.is_control() {
            return Err(ConfigError::InvalidMarker { marker });
        }
        Ok(())
    }
}
