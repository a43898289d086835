//! Sealed namespaces and their external access path

use crate::builder::{BuildContext, Directive, NamespaceBuilder};
use crate::error::{BuildError, CallError, ImmutableNamespaceError, NameNotFoundError};
use crate::scope::ANONYMOUS;
use crate::table::BindingTable;
use crate::value::Value;
use en_visibility::{NamingConvention, ProvideList, Visibility};
use std::fmt;
use std::sync::Arc;

pub(crate) struct NamespaceInner {
    pub(crate) label: Option<String>,
    pub(crate) table: BindingTable,
    pub(crate) provided: ProvideList,
    pub(crate) convention: NamingConvention,
}

/// Immutable, visibility-partitioned set of bindings
///
/// Cloning is cheap and shares the same bindings. Every method here is an
/// external access path: private bindings behave exactly like absent ones.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

impl Namespace {
    pub(crate) const fn from_inner(inner: Arc<NamespaceInner>) -> Self {
        Self { inner }
    }

    pub(crate) const fn inner(&self) -> &Arc<NamespaceInner> {
        &self.inner
    }

    /// Optional label given at construction
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Look up a public or hidden binding
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if the name is absent or private.
    pub fn get(&self, name: &str) -> Result<Value, NameNotFoundError> {
        match self.inner.table.get(name) {
            Some(binding) if binding.visibility.is_external() => {
                Ok(binding.value.clone().anchored_to(self))
            }
            _ => Err(NameNotFoundError::new(name)),
        }
    }

    /// Whether `get` would succeed
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.external_tier(name).is_some()
    }

    /// Tier of an externally reachable binding
    ///
    /// `None` for private and absent names alike.
    #[must_use]
    pub fn visibility(&self, name: &str) -> Option<Visibility> {
        self.external_tier(name)
    }

    /// Externally listed names in table order
    ///
    /// Public names always, hidden names only with `include_hidden`, private
    /// names never.
    #[must_use]
    pub fn list(&self, include_hidden: bool) -> Vec<String> {
        self.inner
            .table
            .iter()
            .filter(|(_, binding)| binding.visibility.is_listed(include_hidden))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Look up an externally reachable function and invoke it
    ///
    /// # Errors
    ///
    /// Fails if the name is absent, private, or not a function, or if the call fails.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        match self.get(name)? {
            Value::Function(function) => function.call(args),
            other => Err(CallError::NotCallable {
                name: name.to_string(),
                kind: other.kind(),
            }),
        }
    }

    /// Rejected: bindings cannot be added or replaced after sealing
    ///
    /// # Errors
    ///
    /// Always returns `ImmutableNamespaceError`.
    pub fn assign(&self, name: &str, _value: Value) -> Result<(), ImmutableNamespaceError> {
        Err(self.immutable(name))
    }

    /// Rejected: bindings cannot be removed after sealing
    ///
    /// # Errors
    ///
    /// Always returns `ImmutableNamespaceError`.
    pub fn remove(&self, name: &str) -> Result<Value, ImmutableNamespaceError> {
        Err(self.immutable(name))
    }

    /// Derive a new namespace from this one
    ///
    /// The new builder starts with every binding of this namespace, all tiers,
    /// and with its provide list, then applies `directives`. This namespace is
    /// left untouched, and functions defined in it keep seeing it.
    ///
    /// # Errors
    ///
    /// Fails like [`crate::build`] if a directive cannot be applied.
    pub fn extend<I>(&self, directives: I, ctx: &dyn BuildContext) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Directive>,
    {
        NamespaceBuilder::seeded_from(self, ctx).run(directives)
    }

    /// Identity comparison
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Public and hidden bindings, in table order, as seen from outside
    pub(crate) fn exported(&self) -> impl Iterator<Item = (&str, Value)> {
        self.inner
            .table
            .iter()
            .filter(|(_, binding)| binding.visibility.is_external())
            .map(move |(name, binding)| (name, binding.value.clone().anchored_to(self)))
    }

    fn external_tier(&self, name: &str) -> Option<Visibility> {
        self.inner
            .table
            .get(name)
            .map(|binding| binding.visibility)
            .filter(|visibility| visibility.is_external())
    }

    fn immutable(&self, name: &str) -> ImmutableNamespaceError {
        tracing::debug!(
            namespace = self.label().unwrap_or(ANONYMOUS),
            name,
            "rejected write to locked namespace"
        );
        ImmutableNamespaceError {
            namespace: self.label().unwrap_or(ANONYMOUS).to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "<namespace {}>", self.label().unwrap_or(ANONYMOUS))
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Namespace")
            .field("label", &self.label())
            .field("public", &self.list(false))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Isolated, build};
    use crate::value::Function;
    use expect_test::expect;
    use std::sync::Arc;

    fn sample() -> Namespace {
        build(
            [
                Directive::bind("a", 1_i64),
                Directive::bind(".b", 2_i64),
                Directive::bind("..c", 3_i64),
                Directive::bind("d", 4_i64),
            ],
            &Isolated,
        )
        .unwrap()
    }

    #[test]
    fn test_list_tiers() {
        let ns = sample();
        expect![[r#"["a", "d"]"#]].assert_eq(&format!("{:?}", ns.list(false)));
        expect![[r#"["a", ".b", "d"]"#]].assert_eq(&format!("{:?}", ns.list(true)));
    }

    #[test]
    fn test_private_indistinguishable_from_absent() {
        let ns = sample();
        let private = ns.get("..c").unwrap_err();
        let absent = ns.get("..zz").unwrap_err();
        assert_eq!(private, NameNotFoundError::new("..c"));
        assert_eq!(absent, NameNotFoundError::new("..zz"));
        assert_eq!(ns.visibility("..c"), ns.visibility("..zz"));
        assert!(!ns.contains("..c"));
    }

    #[test]
    fn test_hidden_is_reachable() {
        let ns = sample();
        assert_eq!(ns.get(".b"), Ok(Value::Int(2)));
        assert_eq!(ns.visibility(".b"), Some(Visibility::Hidden));
    }

    #[test]
    fn test_mutation_rejected() {
        let ns = sample();
        assert!(ns.assign("a", Value::Int(10)).is_err());
        assert!(ns.assign("new", Value::Int(10)).is_err());
        assert!(ns.remove("a").is_err());
        assert_eq!(ns.get("a"), Ok(Value::Int(1)));
        assert!(!ns.contains("new"));
    }

    fn secret_keeper() -> Namespace {
        build(
            [
                Directive::bind("..secret", 7_i64),
                Directive::function("..reader", |scope, _| Ok(scope.get("..secret")?)),
                Directive::function("make", |scope, _| Ok(scope.get("..reader")?)),
                Directive::function("make_fresh", |scope, _| {
                    Ok(Value::Function(Function::new("fresh", scope.clone(), |inner, _| {
                        Ok(inner.get("..secret")?)
                    })))
                }),
                Directive::eval("fns", |scope| {
                    let reader = Function::new("listed", scope.clone(), |inner, _| {
                        Ok(inner.get("..secret")?)
                    });
                    Ok(Value::List(vec![Value::Int(0), Value::Function(reader)]))
                }),
            ],
            &Isolated,
        )
        .unwrap()
    }

    #[test]
    fn test_returned_function_outlives_namespace() {
        let ns = secret_keeper();
        let weak = Arc::downgrade(ns.inner());
        let made = ns.call("make", &[]).unwrap();
        let fresh = ns.call("make_fresh", &[]).unwrap();
        drop(ns);

        assert_eq!(made.as_function().unwrap().call(&[]), Ok(Value::Int(7)));
        assert_eq!(fresh.as_function().unwrap().call(&[]), Ok(Value::Int(7)));

        drop(made);
        drop(fresh);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_function_in_list_outlives_namespace() {
        let ns = secret_keeper();
        let weak = Arc::downgrade(ns.inner());
        let fns = ns.get("fns").unwrap();
        drop(ns);

        let items = match fns {
            Value::List(items) => items,
            other => panic!("expected a list, got {other:?}"),
        };
        assert_eq!(items[1].as_function().unwrap().call(&[]), Ok(Value::Int(7)));

        drop(items);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_display_and_debug() {
        let ns = build([Directive::bind("x", 1_i64)], &Isolated).unwrap();
        assert_eq!(ns.to_string(), "<namespace <anonymous>>");
        expect![[r#"Namespace { label: None, public: ["x"], .. }"#]].assert_eq(&format!("{ns:?}"));
    }
}
