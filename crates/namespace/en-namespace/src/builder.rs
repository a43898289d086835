//! Namespace construction
//!
//! A [`NamespaceBuilder`] applies directives strictly in program order to a
//! working table, then seals the result into a [`Namespace`].
//!
//! Precedence between directives:
//! - plain bindings (`Bind`, `Eval`) always overwrite
//! - unprefixed `Refer` and `Require` insert only names that are still free,
//!   so they never replace anything bound or referred before them, and any
//!   plain binding after them replaces what they inserted
//! - prefixed `Refer` inserts `prefix.name` unconditionally

use crate::error::{BuildError, CallError, ResolutionError};
use crate::loader::{Exports, PackageLoader};
use crate::namespace::{Namespace, NamespaceInner};
use crate::scope::{InternalAccessor, Scope, ScopeState};
use crate::table::{BindingTable, WorkingTable};
use crate::value::{Function, NativeFn, Value};
use en_visibility::{NamingConvention, ProvideList};
use std::fmt;
use std::mem;
use std::sync::Arc;

/// Host expression evaluated at a directive's position
pub type Expr = Arc<dyn Fn(&InternalAccessor) -> Result<Value, CallError> + Send + Sync>;

/// What the builder needs from its surroundings
pub trait BuildContext {
    /// Resolve a name used by a named `refer`
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Exports of a required package
    fn load_package(&self, package: &str) -> Option<Exports>;
}

/// Context that resolves no names and loads no packages
#[derive(Debug, Clone, Copy, Default)]
pub struct Isolated;

impl BuildContext for Isolated {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }

    fn load_package(&self, _package: &str) -> Option<Exports> {
        None
    }
}

/// Context that loads packages but resolves no names
pub struct PackagesOnly<'loader>(pub &'loader dyn PackageLoader);

impl BuildContext for PackagesOnly<'_> {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }

    fn load_package(&self, package: &str) -> Option<Exports> {
        self.0.load(package)
    }
}

/// Source of a `refer`
#[derive(Debug, Clone)]
pub enum NamespaceRef {
    /// An already built namespace
    Namespace(Namespace),
    /// A name bound to a namespace, resolved when the directive runs
    Named(String),
}

/// One step of a namespace definition
#[derive(Clone)]
pub enum Directive {
    /// Bind a computed value
    Bind {
        /// Binding name
        name: String,
        /// Bound value
        value: Value,
    },
    /// Bind the result of a host expression
    Eval {
        /// Binding name
        name: String,
        /// Expression producing the value
        expr: Expr,
    },
    /// Fold another namespace's public and hidden bindings in
    Refer {
        /// Namespace to fold in
        target: NamespaceRef,
        /// Qualifier for the folded names
        prefix: Option<String>,
    },
    /// Declare public names explicitly
    Provide {
        /// Names to make public
        names: Vec<String>,
    },
    /// Import a package's exports into this namespace only
    Require {
        /// Package name
        package: String,
        /// Exports to import; all of them when `None`
        names: Option<Vec<String>>,
    },
}

impl Directive {
    /// Plain binding
    pub fn bind(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Bind {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Binding computed by `expr` with full access to the namespace so far
    pub fn eval<F>(name: impl Into<String>, expr: F) -> Self
    where
        F: Fn(&InternalAccessor) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::Eval {
            name: name.into(),
            expr: Arc::new(expr),
        }
    }

    /// Function closing over the namespace under construction
    pub fn function<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&InternalAccessor, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        let name = name.into();
        let function_name: Arc<str> = Arc::from(name.as_str());
        let body: Arc<NativeFn> = Arc::new(body);
        Self::Eval {
            name,
            expr: Arc::new(move |scope| {
                Ok(Value::Function(Function::from_body(
                    Arc::clone(&function_name),
                    scope.clone(),
                    Arc::clone(&body),
                )))
            }),
        }
    }

    /// Unprefixed refer of a built namespace
    #[must_use]
    pub fn refer(namespace: Namespace) -> Self {
        Self::Refer {
            target: NamespaceRef::Namespace(namespace),
            prefix: None,
        }
    }

    /// Refer of a built namespace under `prefix`
    pub fn refer_as(namespace: Namespace, prefix: impl Into<String>) -> Self {
        Self::Refer {
            target: NamespaceRef::Namespace(namespace),
            prefix: Some(prefix.into()),
        }
    }

    /// Unprefixed refer of a namespace bound to `name`
    pub fn refer_named(name: impl Into<String>) -> Self {
        Self::Refer {
            target: NamespaceRef::Named(name.into()),
            prefix: None,
        }
    }

    /// Refer of a namespace bound to `name`, under `prefix`
    pub fn refer_named_as(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::Refer {
            target: NamespaceRef::Named(name.into()),
            prefix: Some(prefix.into()),
        }
    }

    /// Explicit public names
    pub fn provide<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Provide {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Import every export of `package`
    pub fn require(package: impl Into<String>) -> Self {
        Self::Require {
            package: package.into(),
            names: None,
        }
    }

    /// Import selected exports of `package`
    pub fn require_only<I, S>(package: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Require {
            package: package.into(),
            names: Some(names.into_iter().map(Into::into).collect()),
        }
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { name, value } => formatter
                .debug_struct("Bind")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::Eval { name, .. } => formatter
                .debug_struct("Eval")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Refer { target, prefix } => formatter
                .debug_struct("Refer")
                .field("target", target)
                .field("prefix", prefix)
                .finish(),
            Self::Provide { names } => formatter
                .debug_struct("Provide")
                .field("names", names)
                .finish(),
            Self::Require { package, names } => formatter
                .debug_struct("Require")
                .field("package", package)
                .field("names", names)
                .finish(),
        }
    }
}

/// Single-use builder producing one namespace
///
/// Dropping a builder without calling [`finalize`](Self::finalize) abandons
/// its scope: functions created during construction then resolve nothing.
pub struct NamespaceBuilder<'ctx> {
    ctx: &'ctx dyn BuildContext,
    scope: Arc<Scope>,
    provided: ProvideList,
    convention: NamingConvention,
}

impl<'ctx> NamespaceBuilder<'ctx> {
    /// Create an unlabeled builder
    #[must_use]
    pub fn new(ctx: &'ctx dyn BuildContext) -> Self {
        Self::with_label(ctx, None)
    }

    /// Create a labeled builder
    pub fn labeled(ctx: &'ctx dyn BuildContext, label: impl Into<String>) -> Self {
        Self::with_label(ctx, Some(label.into()))
    }

    fn with_label(ctx: &'ctx dyn BuildContext, label: Option<String>) -> Self {
        Self {
            ctx,
            scope: Scope::open(label),
            provided: ProvideList::new(),
            convention: NamingConvention::default(),
        }
    }

    /// Use a different naming convention when classifying
    #[must_use]
    pub const fn with_convention(mut self, convention: NamingConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Builder pre-filled with every binding of `source`
    pub(crate) fn seeded_from(source: &Namespace, ctx: &'ctx dyn BuildContext) -> Self {
        let inner = source.inner();
        let mut builder = Self::with_label(ctx, inner.label.clone());
        builder.convention = inner.convention;
        builder.provided = inner.provided.clone();
        builder.with_table(|table| {
            for (name, binding) in inner.table.iter() {
                table.bind(name.to_string(), binding.value.clone().anchored_to(source));
            }
        });
        builder
    }

    /// Accessor over the namespace under construction
    #[must_use]
    pub fn scope(&self) -> InternalAccessor {
        InternalAccessor::new(Arc::clone(&self.scope))
    }

    /// Apply one directive
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Resolution` if a refer or require target is
    /// missing, or `BuildError::Evaluation` if a host expression fails.
    pub fn apply(&mut self, directive: Directive) -> Result<(), BuildError> {
        match directive {
            Directive::Bind { name, value } => self.bind(name, value),
            Directive::Eval { name, expr } => {
                // The expression may call back into this scope, so no lock is held here.
                let value = expr(&self.scope()).map_err(|source| BuildError::Evaluation {
                    name: name.clone(),
                    source,
                })?;
                self.bind(name, value);
            }
            Directive::Refer { target, prefix } => self.refer(target, prefix.as_deref())?,
            Directive::Provide { names } => self.provided.extend(names),
            Directive::Require { package, names } => self.require(&package, names.as_deref())?,
        }
        Ok(())
    }

    /// Apply every directive in order, then finalize
    ///
    /// # Errors
    ///
    /// Returns the first directive failure. The builder is dropped in that
    /// case, abandoning its scope.
    pub fn run<I>(mut self, directives: I) -> Result<Namespace, BuildError>
    where
        I: IntoIterator<Item = Directive>,
    {
        for directive in directives {
            self.apply(directive)?;
        }
        Ok(self.finalize())
    }

    /// Classify every binding and seal the namespace
    #[must_use]
    pub fn finalize(mut self) -> Namespace {
        let provided = mem::take(&mut self.provided);
        let mut state = self.scope.write();
        let working = match mem::replace(&mut *state, ScopeState::Abandoned) {
            ScopeState::Open(table) => table,
            ScopeState::Sealed(_) | ScopeState::Abandoned => WorkingTable::default(),
        };
        let table = BindingTable::classify(working, &provided, &self.convention);
        let inner = Arc::new(NamespaceInner {
            label: self.scope.label().map(str::to_string),
            table,
            provided,
            convention: self.convention,
        });
        *state = ScopeState::Sealed(Arc::downgrade(&inner));
        drop(state);

        tracing::debug!(
            namespace = self.scope.display_label(),
            bindings = inner.table.len(),
            "namespace sealed"
        );
        Namespace::from_inner(inner)
    }

    fn bind(&self, name: String, value: Value) {
        self.with_table(|table| table.bind(name, value));
    }

    fn refer(&self, target: NamespaceRef, prefix: Option<&str>) -> Result<(), ResolutionError> {
        let source = match target {
            NamespaceRef::Namespace(namespace) => namespace,
            NamespaceRef::Named(name) => self.resolve_namespace(name)?,
        };
        let exported: Vec<(String, Value)> = source
            .exported()
            .map(|(name, value)| match prefix {
                Some(prefix) => (format!("{prefix}.{name}"), value),
                None => (name.to_string(), value),
            })
            .collect();

        let total = exported.len();
        let inserted = self.with_table(|table| {
            exported.into_iter().fold(0_usize, |count, (name, value)| {
                if prefix.is_some() {
                    table.bind(name, value);
                    count + 1
                } else if table.bind_default(name, value) {
                    count + 1
                } else {
                    count
                }
            })
        });

        tracing::debug!(
            namespace = self.scope.display_label(),
            source = %source,
            prefix,
            inserted,
            shadowed = total - inserted,
            "referred namespace"
        );
        Ok(())
    }

    /// A name bound earlier in this namespace wins over the surrounding context
    fn resolve_namespace(&self, name: String) -> Result<Namespace, ResolutionError> {
        let local = self.scope().get(&name).ok();
        match local.or_else(|| self.ctx.lookup(&name)) {
            Some(Value::Namespace(namespace)) => Ok(namespace),
            Some(other) => Err(ResolutionError::NotANamespace {
                name,
                kind: other.kind(),
            }),
            None => Err(ResolutionError::UnknownNamespace { name }),
        }
    }

    fn require(&self, package: &str, names: Option<&[String]>) -> Result<(), ResolutionError> {
        let exports =
            self.ctx
                .load_package(package)
                .ok_or_else(|| ResolutionError::PackageNotFound {
                    package: package.to_string(),
                })?;

        let selected: Vec<(String, Value)> = match names {
            None => exports.into_iter().collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    exports
                        .get(name)
                        .map(|value| (name.clone(), value.clone()))
                        .ok_or_else(|| ResolutionError::MissingExport {
                            package: package.to_string(),
                            name: name.clone(),
                        })
                })
                .collect::<Result<_, _>>()?,
        };

        let count = selected.len();
        self.with_table(|table| {
            for (name, value) in selected {
                table.bind_default(name, value);
            }
        });
        tracing::debug!(
            namespace = self.scope.display_label(),
            package,
            count,
            "required package"
        );
        Ok(())
    }

    /// Run `update` against the working table
    ///
    /// Only this builder moves its scope out of `Open`, and it does so while
    /// being consumed or dropped, so the table is always present here.
    fn with_table<R: Default>(&self, update: impl FnOnce(&mut WorkingTable) -> R) -> R {
        match &mut *self.scope.write() {
            ScopeState::Open(table) => update(table),
            ScopeState::Sealed(_) | ScopeState::Abandoned => R::default(),
        }
    }
}

impl Drop for NamespaceBuilder<'_> {
    fn drop(&mut self) {
        let mut state = self.scope.write();
        if matches!(*state, ScopeState::Open(_)) {
            *state = ScopeState::Abandoned;
            tracing::debug!(
                namespace = self.scope.display_label(),
                "namespace construction abandoned"
            );
        }
    }
}

/// Build a namespace from a directive sequence
///
/// # Errors
///
/// Returns the first directive failure; no namespace is produced in that case.
pub fn build<I>(directives: I, ctx: &dyn BuildContext) -> Result<Namespace, BuildError>
where
    I: IntoIterator<Item = Directive>,
{
    NamespaceBuilder::new(ctx).run(directives)
}

/// Build a labeled namespace from a directive sequence
///
/// # Errors
///
/// Returns the first directive failure; no namespace is produced in that case.
pub fn build_labeled<I>(
    label: impl Into<String>,
    directives: I,
    ctx: &dyn BuildContext,
) -> Result<Namespace, BuildError>
where
    I: IntoIterator<Item = Directive>,
{
    NamespaceBuilder::labeled(ctx, label).run(directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NameNotFoundError;
    use crate::loader::MapLoader;
    use std::sync::Mutex;

    #[test]
    fn test_plain_binding_last_write_wins() {
        let ns = build(
            [Directive::bind("x", 1_i64), Directive::bind("x", 2_i64)],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.get("x"), Ok(Value::Int(2)));
        assert_eq!(ns.list(true), vec!["x".to_string()]);
    }

    #[test]
    fn test_later_bind_overrides_refer() {
        let a = build([Directive::bind("f", 1_i64)], &Isolated).unwrap();
        let b = build([Directive::refer(a), Directive::bind("f", 2_i64)], &Isolated).unwrap();
        assert_eq!(b.get("f"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_refer_does_not_override_earlier_bind() {
        let a = build([Directive::bind("f", 1_i64)], &Isolated).unwrap();
        let b = build([Directive::bind("f", 2_i64), Directive::refer(a)], &Isolated).unwrap();
        assert_eq!(b.get("f"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_first_refer_wins_among_referred_names() {
        let a = build([Directive::bind("v", "a")], &Isolated).unwrap();
        let b = build([Directive::bind("v", "b")], &Isolated).unwrap();
        let c = build([Directive::refer(a), Directive::refer(b)], &Isolated).unwrap();
        assert_eq!(c.get("v"), Ok(Value::from("a")));
    }

    #[test]
    fn test_refer_exposes_source_values() {
        let a = build(
            [Directive::bind("a", 1_i64), Directive::bind("b", 2_i64)],
            &Isolated,
        )
        .unwrap();
        let b = build([Directive::refer(a)], &Isolated).unwrap();
        assert_eq!(b.get("a"), Ok(Value::Int(1)));
        assert_eq!(b.get("b"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_prefixed_refer() {
        let a = build(
            [Directive::bind("a", 1_i64), Directive::bind("b", 2_i64)],
            &Isolated,
        )
        .unwrap();
        let b = build([Directive::refer_as(a, "p")], &Isolated).unwrap();
        assert_eq!(b.get("p.a"), Ok(Value::Int(1)));
        assert_eq!(b.get("p.b"), Ok(Value::Int(2)));
        assert!(b.get("a").is_err());
        assert!(b.get("b").is_err());
    }

    #[test]
    fn test_prefixed_refer_overwrites_qualified_name() {
        let a = build([Directive::bind("a", 1_i64)], &Isolated).unwrap();
        let b = build(
            [Directive::bind("p.a", 0_i64), Directive::refer_as(a, "p")],
            &Isolated,
        )
        .unwrap();
        assert_eq!(b.get("p.a"), Ok(Value::Int(1)));
    }

    #[test]
    fn test_private_bindings_are_not_referable() {
        let a = build(
            [
                Directive::bind("pub", 1_i64),
                Directive::bind(".hid", 2_i64),
                Directive::bind("..priv", 3_i64),
            ],
            &Isolated,
        )
        .unwrap();
        let b = build([Directive::refer(a)], &Isolated).unwrap();
        assert_eq!(b.get("pub"), Ok(Value::Int(1)));
        assert_eq!(b.get(".hid"), Ok(Value::Int(2)));
        assert_eq!(b.get("..priv"), Err(NameNotFoundError::new("..priv")));
        assert_eq!(b.list(true), vec!["pub".to_string(), ".hid".to_string()]);
    }

    #[test]
    fn test_named_refer_resolves_local_binding_first() {
        let inner = build([Directive::bind("x", 1_i64)], &Isolated).unwrap();
        let outer = build(
            [Directive::bind("m", inner), Directive::refer_named_as("m", "m")],
            &Isolated,
        )
        .unwrap();
        assert_eq!(outer.get("m.x"), Ok(Value::Int(1)));
    }

    #[test]
    fn test_named_refer_errors() {
        let missing = build([Directive::refer_named("nope")], &Isolated).unwrap_err();
        assert_eq!(
            missing,
            BuildError::Resolution(ResolutionError::UnknownNamespace {
                name: "nope".to_string()
            })
        );

        let wrong = build(
            [Directive::bind("n", 1_i64), Directive::refer_named("n")],
            &Isolated,
        )
        .unwrap_err();
        assert_eq!(
            wrong,
            BuildError::Resolution(ResolutionError::NotANamespace {
                name: "n".to_string(),
                kind: "int",
            })
        );
    }

    #[test]
    fn test_provide_overrides_convention() {
        let ns = build(
            [
                Directive::provide(["x"]),
                Directive::bind("x", 1_i64),
                Directive::bind("y", 2_i64),
                Directive::bind(".z", 3_i64),
            ],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.list(false), vec!["x".to_string()]);
        assert_eq!(ns.list(true), vec!["x".to_string()]);
        assert!(ns.get("y").is_err());
        assert!(ns.get(".z").is_err());
    }

    #[test]
    fn test_provide_merges() {
        let ns = build(
            [
                Directive::bind("x", 1_i64),
                Directive::bind("y", 2_i64),
                Directive::bind("z", 3_i64),
                Directive::provide(["x"]),
                Directive::provide(["z"]),
            ],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.list(false), vec!["x".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_private_reachable_from_closure() {
        let ns = build(
            [
                Directive::bind("..secret", 41_i64),
                Directive::function("reveal", |scope, _| {
                    let secret = scope.get("..secret")?;
                    Ok(Value::Int(secret.as_int().unwrap_or_default() + 1))
                }),
            ],
            &Isolated,
        )
        .unwrap();
        assert!(ns.get("..secret").is_err());
        assert_eq!(ns.call("reveal", &[]), Ok(Value::Int(42)));
    }

    #[test]
    fn test_closure_sees_final_table() {
        let ns = build(
            [
                Directive::function("get_later", |scope, _| Ok(scope.get("later")?)),
                Directive::bind("later", 7_i64),
            ],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.call("get_later", &[]), Ok(Value::Int(7)));
    }

    #[test]
    fn test_eval_can_call_earlier_function() {
        let ns = build(
            [
                Directive::function("..double", |_, args| {
                    CallError::check_arity("..double", 1, args)?;
                    Ok(Value::Int(args[0].as_int().unwrap_or_default() * 2))
                }),
                Directive::eval("answer", |scope| scope.call("..double", &[Value::Int(21)])),
            ],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.get("answer"), Ok(Value::Int(42)));
    }

    #[test]
    fn test_closure_cannot_write_after_seal() {
        let ns = build(
            [
                Directive::bind("x", 1_i64),
                Directive::function("set_x", |scope, args| {
                    scope.assign("x", args[0].clone())?;
                    Ok(Value::Unit)
                }),
            ],
            &Isolated,
        )
        .unwrap();
        let result = ns.call("set_x", &[Value::Int(99)]);
        assert!(matches!(result, Err(CallError::Immutable(_))));
        assert_eq!(ns.get("x"), Ok(Value::Int(1)));
    }

    #[test]
    fn test_closure_can_write_during_construction() {
        let ns = build(
            [
                Directive::function("init", |scope, _| {
                    scope.assign("..state", Value::Int(5))?;
                    Ok(Value::Unit)
                }),
                Directive::eval("_", |scope| scope.call("init", &[])),
                Directive::function("state", |scope, _| Ok(scope.get("..state")?)),
            ],
            &Isolated,
        )
        .unwrap();
        assert_eq!(ns.call("state", &[]), Ok(Value::Int(5)));
    }

    #[test]
    fn test_require_binds_locally() {
        let loader = MapLoader::new().with_package("math", [("pi", 3_i64), ("tau", 6_i64)]);
        let ns = build(
            [Directive::require("math"), Directive::bind("tau", 0_i64)],
            &PackagesOnly(&loader),
        )
        .unwrap();
        assert_eq!(ns.get("pi"), Ok(Value::Int(3)));
        assert_eq!(ns.get("tau"), Ok(Value::Int(0)));
    }

    #[test]
    fn test_require_only() {
        let loader = MapLoader::new().with_package("math", [("pi", 3_i64), ("tau", 6_i64)]);
        let ns = build(
            [Directive::require_only("math", ["tau"])],
            &PackagesOnly(&loader),
        )
        .unwrap();
        assert_eq!(ns.list(false), vec!["tau".to_string()]);

        let error = build(
            [Directive::require_only("math", ["e"])],
            &PackagesOnly(&loader),
        )
        .unwrap_err();
        assert_eq!(
            error,
            BuildError::Resolution(ResolutionError::MissingExport {
                package: "math".to_string(),
                name: "e".to_string(),
            })
        );
    }

    #[test]
    fn test_require_missing_package_aborts() {
        let error = build([Directive::require("nope")], &Isolated).unwrap_err();
        assert_eq!(
            error,
            BuildError::Resolution(ResolutionError::PackageNotFound {
                package: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_failed_build_abandons_scope() {
        let leaked: Arc<Mutex<Option<InternalAccessor>>> = Arc::default();
        let sink = Arc::clone(&leaked);
        let result = build(
            [
                Directive::bind("x", 1_i64),
                Directive::eval("grab", move |scope| {
                    if let Ok(mut slot) = sink.lock() {
                        *slot = Some(scope.clone());
                    }
                    Ok(Value::Unit)
                }),
                Directive::refer_named("missing"),
            ],
            &Isolated,
        );
        assert!(result.is_err());

        let accessor = leaked.lock().unwrap().clone().unwrap();
        assert!(accessor.get("x").is_err());
        assert!(accessor.assign("y", Value::Unit).is_err());
    }

    #[test]
    fn test_eval_failure_aborts() {
        let error = build(
            [Directive::eval("x", |_| Err(CallError::failed("boom")))],
            &Isolated,
        )
        .unwrap_err();
        assert_eq!(
            error,
            BuildError::Evaluation {
                name: "x".to_string(),
                source: CallError::failed("boom"),
            }
        );
    }

    #[test]
    fn test_custom_convention() {
        let mut builder =
            NamespaceBuilder::labeled(&Isolated, "m").with_convention(NamingConvention::new('_'));
        builder.apply(Directive::bind("_hidden", 1_i64)).unwrap();
        builder.apply(Directive::bind("__private", 2_i64)).unwrap();
        builder.apply(Directive::bind(".public", 3_i64)).unwrap();
        let ns = builder.finalize();
        assert_eq!(ns.label(), Some("m"));
        assert_eq!(ns.list(false), vec![".public".to_string()]);
        assert_eq!(ns.list(true), vec!["_hidden".to_string(), ".public".to_string()]);
    }

    #[test]
    fn test_extend_keeps_original() {
        let base = build_labeled(
            "base",
            [
                Directive::bind("a", 1_i64),
                Directive::bind("..p", 2_i64),
            ],
            &Isolated,
        )
        .unwrap();
        let extended = base
            .extend(
                [
                    Directive::bind("a", 10_i64),
                    Directive::function("peek", |scope, _| Ok(scope.get("..p")?)),
                ],
                &Isolated,
            )
            .unwrap();

        assert_eq!(base.get("a"), Ok(Value::Int(1)));
        assert!(base.get("peek").is_err());
        assert_eq!(extended.get("a"), Ok(Value::Int(10)));
        assert_eq!(extended.call("peek", &[]), Ok(Value::Int(2)));
        assert_eq!(extended.label(), Some("base"));
    }

    #[test]
    fn test_function_keeps_namespace_alive() {
        let function = {
            let ns = build(
                [
                    Directive::bind("..n", 3_i64),
                    Directive::function("n", |scope, _| Ok(scope.get("..n")?)),
                ],
                &Isolated,
            )
            .unwrap();
            ns.get("n").unwrap()
        };
        let function = function.as_function().unwrap();
        assert_eq!(function.call(&[]), Ok(Value::Int(3)));
    }
}
