//! Runtime value representation

#![allow(
    clippy::min_ident_chars,
    reason = "Short identifiers like i, f, b, s are conventional in value implementations"
)]

use crate::error::CallError;
use crate::namespace::Namespace;
use crate::scope::InternalAccessor;
use std::fmt;
use std::ptr;
use std::sync::Arc;

/// Native function body
///
/// Receives the accessor of the namespace the function was defined in, so it
/// can read that namespace's bindings of every tier.
pub type NativeFn = dyn Fn(&InternalAccessor, &[Value]) -> Result<Value, CallError> + Send + Sync;

/// Value bound to a name
#[derive(Debug, Clone)]
pub enum Value {
    /// Unit value
    Unit,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// List value
    List(Vec<Self>),
    /// Function closing over its defining namespace
    Function(Function),
    /// Embedded namespace
    Namespace(Namespace),
}

impl Value {
    /// Get the value as a boolean, if possible
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer, if possible
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, if possible
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a string slice, if possible
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a function, if possible
    #[must_use]
    pub const fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Get the value as a namespace, if possible
    #[must_use]
    pub const fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Short name of the value's kind, for error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Function(_) => "function",
            Self::Namespace(_) => "namespace",
        }
    }

    /// Pin a function read from outside `owner` to that namespace
    ///
    /// Functions only hold their own namespace weakly. A copy handed out
    /// through an external path keeps the namespace alive instead.
    #[must_use]
    pub(crate) fn anchored_to(self, owner: &Namespace) -> Self {
        match self {
            Self::Function(function) => Self::Function(function.with_anchor(owner.clone())),
            Self::List(elements) => Self::List(
                elements
                    .into_iter()
                    .map(|element| element.anchored_to(owner))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Pin every function in a value leaving a call to its own namespace
    ///
    /// Functions whose namespace is still open or already gone stay as they are.
    #[must_use]
    pub(crate) fn escaping(self) -> Self {
        match self {
            Self::Function(function) => Self::Function(function.pinned()),
            Self::List(elements) => Self::List(elements.into_iter().map(Self::escaping).collect()),
            other => other,
        }
    }
}

impl PartialEq for Value {
    #[allow(
        clippy::float_cmp,
        reason = "Float values compare with IEEE semantics, as a derived impl would"
    )]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Namespace(a), Self::Namespace(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<Namespace> for Value {
    fn from(namespace: Namespace) -> Self {
        Self::Namespace(namespace)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(elements) => {
                write!(f, "[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Self::Function(function) => write!(f, "<fn {}>", function.name()),
            Self::Namespace(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// Function value
///
/// Captures the internal accessor of the namespace it was defined in.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    scope: InternalAccessor,
    body: Arc<NativeFn>,
    anchor: Option<Namespace>,
}

impl Function {
    /// Create a function closing over `scope`
    pub fn new<F>(name: impl Into<Arc<str>>, scope: InternalAccessor, body: F) -> Self
    where
        F: Fn(&InternalAccessor, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::from_body(name, scope, Arc::new(body))
    }

    /// Create a function from a shared body
    pub fn from_body(name: impl Into<Arc<str>>, scope: InternalAccessor, body: Arc<NativeFn>) -> Self {
        Self {
            name: name.into(),
            scope,
            body,
            anchor: None,
        }
    }

    /// Create a function that is not defined inside any namespace
    ///
    /// Used for values supplied by package loaders. Its accessor resolves nothing.
    pub fn native<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&InternalAccessor, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::new(name, InternalAccessor::detached(), body)
    }

    /// Function name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accessor of the defining namespace
    #[must_use]
    pub const fn scope(&self) -> &InternalAccessor {
        &self.scope
    }

    /// Invoke the function
    ///
    /// # Errors
    ///
    /// Propagates whatever the body reports.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        (self.body)(&self.scope, args).map(Value::escaping)
    }

    /// Identity comparison: same body defined in the same namespace
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ptr::addr_eq(Arc::as_ptr(&self.body), Arc::as_ptr(&other.body))
            && Arc::ptr_eq(self.scope.scope(), other.scope.scope())
    }

    fn pinned(mut self) -> Self {
        if self.anchor.is_none() {
            self.anchor = self.scope.namespace();
        }
        self
    }

    fn with_anchor(mut self, owner: Namespace) -> Self {
        if self.anchor.is_none() {
            self.anchor = Some(owner);
        }
        self
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
