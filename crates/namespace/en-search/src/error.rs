//! Error types for the search path

use miette::Diagnostic;
use thiserror::Error;

/// Detach of a label that is not on the search path
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("no namespace is attached as `{label}`")]
#[diagnostic(
    code(enclave::search::not_attached),
    help("list the attached labels with `SearchPath::labels`")
)]
pub struct NotAttachedError {
    /// The label that was detached
    pub label: String,
}
