//! Namespace construction and access for Enclave
//!
//! A namespace is an immutable set of bindings, each in one of three
//! visibility tiers. It is produced by applying a sequence of directives to a
//! [`NamespaceBuilder`] and is locked from the moment it exists.
//!
//! # Architecture
//!
//! - **Directives**: plain bindings, `refer` of other namespaces, `provide`
//!   lists, and `require` of packages, applied in program order
//! - **Scope**: the construction scope shared by the builder and every
//!   function defined during construction; functions read it through an
//!   [`InternalAccessor`] that sees all tiers
//! - **Namespace**: the sealed result, whose own methods form the external
//!   access path and treat private bindings as absent
//!
//! # Usage
//!
//! ```rust,ignore
//! use en_namespace::{build, Directive, Isolated, Value};
//!
//! let math = build([Directive::bind("pi", 3_i64)], &Isolated)?;
//! let app = build([Directive::refer_as(math, "m")], &Isolated)?;
//! assert_eq!(app.get("m.pi")?, Value::Int(3));
//! ```

pub mod builder;
pub mod error;
pub mod loader;
pub mod namespace;
pub mod scope;
mod table;
pub mod value;

pub use builder::{
    BuildContext, Directive, Expr, Isolated, NamespaceBuilder, NamespaceRef, PackagesOnly, build,
    build_labeled,
};
pub use en_visibility::{NamingConvention, ProvideList, Visibility};
pub use error::{
    BuildError, CallError, ImmutableNamespaceError, NameNotFoundError, ResolutionError,
};
pub use loader::{Exports, MapLoader, NoPackages, PackageLoader};
pub use namespace::Namespace;
pub use scope::InternalAccessor;
pub use value::{Function, NativeFn, Value};
