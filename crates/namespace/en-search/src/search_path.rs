//! Ordered registry of attached namespaces

use crate::error::NotAttachedError;
use en_namespace::{NameNotFoundError, Namespace, Value};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One attached namespace
#[derive(Debug, Clone)]
pub struct SearchPathEntry {
    label: String,
    namespace: Namespace,
}

impl SearchPathEntry {
    /// Label the namespace was attached under
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The attached namespace
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

/// Externally listed names of one attached namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryContents {
    /// Label of the entry
    pub label: String,
    /// Names the entry lists, in table order
    pub names: Vec<String>,
}

/// Search path consulted for unqualified names
///
/// Entries are unique by label and ordered most recently attached first.
/// Every operation takes the internal lock once, so attach, detach, and
/// resolution never observe a half-updated path.
#[derive(Debug, Default)]
pub struct SearchPath {
    entries: RwLock<Vec<SearchPathEntry>>,
}

impl SearchPath {
    /// Create an empty search path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `namespace` under `label` at the front
    ///
    /// An entry with the same label is removed in the same step. Returns the
    /// namespace it held.
    pub fn attach(&self, label: impl Into<String>, namespace: Namespace) -> Option<Namespace> {
        let label = label.into();
        let mut entries = self.write();
        let replaced = entries
            .iter()
            .position(|entry| entry.label == label)
            .map(|index| entries.remove(index).namespace);
        tracing::debug!(
            label = %label,
            namespace = %namespace,
            replaced = replaced.is_some(),
            "attached namespace"
        );
        entries.insert(0, SearchPathEntry { label, namespace });
        replaced
    }

    /// Remove the entry attached under `label`
    ///
    /// # Errors
    ///
    /// Returns `NotAttachedError` if no entry has that label.
    pub fn detach(&self, label: &str) -> Result<Namespace, NotAttachedError> {
        let mut entries = self.write();
        let index = entries
            .iter()
            .position(|entry| entry.label == label)
            .ok_or_else(|| NotAttachedError {
                label: label.to_string(),
            })?;
        let entry = entries.remove(index);
        tracing::debug!(label, "detached namespace");
        Ok(entry.namespace)
    }

    /// Resolve `name` against the attached namespaces, front to back
    ///
    /// Uses each namespace's external access path, so private bindings are
    /// never found here.
    ///
    /// # Errors
    ///
    /// Returns `NameNotFoundError` if no entry yields the name.
    pub fn resolve(&self, name: &str) -> Result<Value, NameNotFoundError> {
        self.read()
            .iter()
            .find_map(|entry| entry.namespace.get(name).ok())
            .ok_or_else(|| NameNotFoundError::new(name))
    }

    /// Label of the first entry that exports `name`
    #[must_use]
    pub fn provider_of(&self, name: &str) -> Option<String> {
        self.read()
            .iter()
            .find(|entry| entry.namespace.contains(name))
            .map(|entry| entry.label.clone())
    }

    /// Namespace attached under `label`
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Namespace> {
        self.read()
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.namespace.clone())
    }

    /// Whether an entry is attached under `label`
    #[must_use]
    pub fn is_attached(&self, label: &str) -> bool {
        self.read().iter().any(|entry| entry.label == label)
    }

    /// Labels, front to back
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.read().iter().map(|entry| entry.label.clone()).collect()
    }

    /// Copy of the current entries, front to back
    #[must_use]
    pub fn snapshot(&self) -> Vec<SearchPathEntry> {
        self.read().clone()
    }

    /// Every entry's label with the names it lists
    #[must_use]
    pub fn contents(&self, include_hidden: bool) -> Vec<EntryContents> {
        self.read()
            .iter()
            .map(|entry| EntryContents {
                label: entry.label.clone(),
                names: entry.namespace.list(include_hidden),
            })
            .collect()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Detach everything
    pub fn reset(&self) {
        let mut entries = self.write();
        tracing::debug!(count = entries.len(), "search path reset");
        entries.clear();
    }

    // Each critical section is a single Vec operation, so a poisoned lock
    // still holds a valid path.
    fn read(&self) -> RwLockReadGuard<'_, Vec<SearchPathEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<SearchPathEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use en_namespace::{Directive, Isolated, build};
    use expect_test::expect;
    use std::sync::Arc;
    use std::thread;

    fn ns(bindings: &[(&str, i64)]) -> Namespace {
        build(
            bindings
                .iter()
                .map(|(name, value)| Directive::bind(*name, *value)),
            &Isolated,
        )
        .unwrap()
    }

    #[test]
    fn test_attach_then_resolve_then_detach() {
        let path = SearchPath::new();
        path.attach("m", ns(&[("only_here", 1)]));
        assert_eq!(path.resolve("only_here"), Ok(Value::Int(1)));

        path.detach("m").unwrap();
        assert_eq!(
            path.resolve("only_here"),
            Err(NameNotFoundError::new("only_here"))
        );
    }

    #[test]
    fn test_attach_same_label_replaces() {
        let path = SearchPath::new();
        let first = ns(&[("v", 1)]);
        let second = ns(&[("v", 2)]);

        assert!(path.attach("m", first.clone()).is_none());
        let replaced = path.attach("m", second).unwrap();

        assert!(replaced.ptr_eq(&first));
        assert_eq!(path.len(), 1);
        assert_eq!(path.labels(), vec!["m".to_string()]);
        assert_eq!(path.resolve("v"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_most_recent_attach_wins() {
        let path = SearchPath::new();
        path.attach("a", ns(&[("v", 1), ("only_a", 10)]));
        path.attach("b", ns(&[("v", 2)]));

        assert_eq!(path.resolve("v"), Ok(Value::Int(2)));
        assert_eq!(path.resolve("only_a"), Ok(Value::Int(10)));
        assert_eq!(path.provider_of("v"), Some("b".to_string()));
        assert_eq!(path.labels(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_reattach_moves_to_front() {
        let path = SearchPath::new();
        path.attach("a", ns(&[("v", 1)]));
        path.attach("b", ns(&[("v", 2)]));
        path.attach("a", ns(&[("v", 3)]));

        assert_eq!(path.labels(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(path.resolve("v"), Ok(Value::Int(3)));
    }

    #[test]
    fn test_private_not_reachable() {
        let path = SearchPath::new();
        path.attach("m", ns(&[("..secret", 1), (".hidden", 2)]));
        assert!(path.resolve("..secret").is_err());
        assert_eq!(path.resolve(".hidden"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_detach_unknown_label() {
        let path = SearchPath::new();
        assert_eq!(
            path.detach("ghost").unwrap_err(),
            NotAttachedError {
                label: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_contents() {
        let path = SearchPath::new();
        path.attach("a", ns(&[("x", 1), (".h", 2), ("..p", 3)]));
        path.attach("b", ns(&[("y", 4)]));

        let listing: Vec<_> = path
            .contents(false)
            .into_iter()
            .map(|entry| format!("{}: {:?}", entry.label, entry.names))
            .collect();
        expect![[r#"["b: [\"y\"]", "a: [\"x\"]"]"#]].assert_eq(&format!("{listing:?}"));

        assert_eq!(path.contents(true)[1].names, vec!["x".to_string(), ".h".to_string()]);
    }

    #[test]
    fn test_reset() {
        let path = SearchPath::new();
        path.attach("a", ns(&[("x", 1)]));
        path.reset();
        assert!(path.is_empty());
        assert!(!path.is_attached("a"));
        assert!(path.get("a").is_none());
    }

    #[test]
    fn test_concurrent_attach_keeps_labels_unique() {
        let path = Arc::new(SearchPath::new());
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let path = Arc::clone(&path);
                thread::spawn(move || {
                    for _ in 0..50 {
                        path.attach("shared", ns(&[("v", index)]));
                        let _resolved = path.resolve("v");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(path.len(), 1);
        assert!(path.resolve("v").is_ok());
    }
}
