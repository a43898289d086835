//! Driver-level errors

use en_namespace::{BuildError, CallError, ImmutableNamespaceError, NameNotFoundError};
use en_search::NotAttachedError;
use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Configuration could not be loaded
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file `{}`", path.display())]
    #[diagnostic(code(enclave::config::read))]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The contents are not a valid configuration
    #[error("invalid configuration")]
    #[diagnostic(code(enclave::config::parse))]
    Parse(#[from] TomlError),

    /// The visibility marker cannot prefix a name unambiguously
    #[error("`{marker}` cannot be used as the visibility marker")]
    #[diagnostic(
        code(enclave::config::invalid_marker),
        help("use a single punctuation character such as `.` or `_`")
    )]
    InvalidMarker {
        /// The rejected marker
        marker: char,
    },
}

/// Any failure surfaced by the engine
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// Configuration failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// Namespace construction failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    /// Lookup miss
    #[error(transparent)]
    #[diagnostic(transparent)]
    NameNotFound(#[from] NameNotFoundError),

    /// Write to a locked namespace
    #[error(transparent)]
    #[diagnostic(transparent)]
    Immutable(#[from] ImmutableNamespaceError),

    /// Detach of an unknown label
    #[error(transparent)]
    #[diagnostic(transparent)]
    NotAttached(#[from] NotAttachedError),

    /// Function call failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Call(#[from] CallError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_keeps_inner_code() {
        let error = EngineError::from(NotAttachedError {
            label: "m".to_string(),
        });
        assert_eq!(error.to_string(), "no namespace is attached as `m`");
        assert_eq!(
            error.code().map(|code| code.to_string()),
            Some("enclave::search::not_attached".to_string())
        );
    }

    #[test]
    fn test_invalid_marker_message() {
        let error = ConfigError::InvalidMarker { marker: 'a' };
        assert_eq!(error.to_string(), "`a` cannot be used as the visibility marker");
    }
}
