//! Error types for namespace construction and access

use miette::Diagnostic;
use thiserror::Error;

/// A `refer` or `require` target could not be found during construction
///
/// Always fatal to the construction that raised it: no partially built
/// namespace is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolutionError {
    /// No binding with this name is visible to the builder
    #[error("no namespace named `{name}` is in scope")]
    #[diagnostic(
        code(enclave::namespace::unknown_namespace),
        help("build the namespace first and bind or attach it under this name")
    )]
    UnknownNamespace {
        /// The name that was referred to
        name: String,
    },

    /// The name resolved, but not to a namespace
    #[error("`{name}` is bound to a {kind}, not a namespace")]
    #[diagnostic(code(enclave::namespace::not_a_namespace))]
    NotANamespace {
        /// The name that was referred to
        name: String,
        /// Kind of the value that was found instead
        kind: &'static str,
    },

    /// The package loader has no package under this name
    #[error("package `{package}` could not be loaded")]
    #[diagnostic(
        code(enclave::namespace::package_not_found),
        help("register the package with the loader before requiring it")
    )]
    PackageNotFound {
        /// The requested package
        package: String,
    },

    /// A selectively required name is not exported by the package
    #[error("package `{package}` does not export `{name}`")]
    #[diagnostic(code(enclave::namespace::missing_export))]
    MissingExport {
        /// The requested package
        package: String,
        /// The name that is not exported
        name: String,
    },
}

/// External lookup miss
///
/// Raised both for absent names and for private ones, with the same message,
/// so a caller cannot tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("name `{name}` not found")]
#[diagnostic(code(enclave::namespace::name_not_found))]
pub struct NameNotFoundError {
    /// The name that was looked up
    pub name: String,
}

impl NameNotFoundError {
    /// Create a miss for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A write was attempted on a locked namespace
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("cannot bind `{name}`: namespace {namespace} is locked")]
#[diagnostic(
    code(enclave::namespace::immutable),
    help("namespaces are immutable once built; use `extend` to derive a new one")
)]
pub struct ImmutableNamespaceError {
    /// Label of the namespace, or `<anonymous>`
    pub namespace: String,
    /// The name that was written
    pub name: String,
}

/// Failure while invoking a function or evaluating a host expression
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CallError {
    /// A name the function needed was not visible
    #[error(transparent)]
    #[diagnostic(transparent)]
    NameNotFound(#[from] NameNotFoundError),

    /// The function tried to write into a locked namespace
    #[error(transparent)]
    #[diagnostic(transparent)]
    Immutable(#[from] ImmutableNamespaceError),

    /// The callee is not a function
    #[error("`{name}` is a {kind}, not a function")]
    #[diagnostic(code(enclave::namespace::not_callable))]
    NotCallable {
        /// The name that was called
        name: String,
        /// Kind of the value that was found
        kind: &'static str,
    },

    /// Wrong number of arguments
    #[error("`{function}` expects {expected} argument(s), got {actual}")]
    #[diagnostic(code(enclave::namespace::arity))]
    Arity {
        /// The function that was called
        function: String,
        /// Expected argument count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Any other failure reported by the function body
    #[error("{message}")]
    #[diagnostic(code(enclave::namespace::call_failed))]
    Failed {
        /// Description of the failure
        message: String,
    },
}

impl CallError {
    /// Failure with a free-form message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Check an argument count
    ///
    /// # Errors
    ///
    /// Returns `CallError::Arity` when `args` does not hold exactly `expected` values.
    pub fn check_arity<T>(function: &str, expected: usize, args: &[T]) -> Result<(), Self> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(Self::Arity {
                function: function.to_string(),
                expected,
                actual: args.len(),
            })
        }
    }
}

/// Construction of a namespace failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BuildError {
    /// A `refer` or `require` target was missing
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    /// A host expression failed while computing a binding
    #[error("evaluating `{name}` failed")]
    #[diagnostic(code(enclave::namespace::evaluation))]
    Evaluation {
        /// The binding being computed
        name: String,
        /// Why evaluation failed
        #[source]
        source: CallError,
    },
}
