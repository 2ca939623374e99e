//! Namespace engine: hierarchical model numbering over context stacks.
//!
//! The engine is the process-scoped state object: it owns one context
//! registry and one counter registry, and implements the numbering state
//! machine on top of them. Create one per process and pass it by
//! reference; tests create a fresh engine each to avoid leakage.
//!
//! Scope entry reads the current path for a key, allocates the next
//! sibling id from the parent path's counter bucket, and pushes the
//! extended path; dropping the returned [`ModelScope`] pops it. A scope
//! at path `[1, 2]` under key `"model"` carries the label `"model_1_2"`.
//!
//! Not safe for concurrent use: the registries are `!Sync`; callers
//! serialize access externally if needed.

use serde_json::Value;

use crate::counter::{UidRegistry, DEFAULT_NAMESPACE};
use crate::label::{label, path_value, value_path};
use crate::stack::{ContextError, ContextGuard, ContextRegistry};

/// Root key used for model numbering unless a caller picks its own.
pub const DEFAULT_MODEL_NAMESPACE: &str = "model";

/// Process-scoped numbering state: context stacks plus uid counters.
#[derive(Debug, Default)]
pub struct NamespaceEngine {
    contexts: ContextRegistry,
    counters: UidRegistry,
}

impl NamespaceEngine {
    /// Create an engine with empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from restored registries (snapshot restore).
    pub fn from_parts(contexts: ContextRegistry, counters: UidRegistry) -> Self {
        Self { contexts, counters }
    }

    /// The context-stack registry.
    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    /// The uid-counter registry.
    pub fn counters(&self) -> &UidRegistry {
        &self.counters
    }

    /// Open a numbered scope under `key`.
    ///
    /// With no active context the scope becomes the namespace root: the
    /// empty path is pushed and the counter for `key` itself is reset, so
    /// children start at 1. With a current path `P`, the next sibling id
    /// `n` is drawn from the bucket `label(key, P)`, the path `P + [n]`
    /// is pushed, and the bucket for the new path is reset.
    ///
    /// The returned guard pops the pushed path when dropped, exactly one
    /// pop per enter, on every exit path. Scopes for the same key must be
    /// dropped LIFO.
    pub fn model_scope(&self, key: &str) -> ModelScope<'_> {
        match self.contexts.top(key) {
            Ok(current) => {
                let parent = value_path(&current);
                let sibling = self.counters.next_id(&label(key, &parent));
                let mut path = parent;
                path.push(sibling);
                let scope_label = label(key, &path);
                log::debug!("entering model scope {:?}", scope_label);
                let guard = self.contexts.enter(key, path_value(&path));
                self.counters.reset(&scope_label);
                ModelScope {
                    _guard: guard,
                    label: scope_label,
                    path,
                }
            }
            Err(_) => {
                log::debug!("entering root model scope {:?}", key);
                let guard = self.contexts.enter(key, Value::Array(Vec::new()));
                self.counters.reset(key);
                ModelScope {
                    _guard: guard,
                    label: key.to_string(),
                    path: Vec::new(),
                }
            }
        }
    }

    /// Next child label under the current context for `key`, without
    /// opening a scope.
    ///
    /// With no active context, falls back to a fresh id in the
    /// [`DEFAULT_NAMESPACE`] bucket and returns `"default_<n>"`.
    ///
    /// The computed id is consumed from the same bucket scope entry draws
    /// from, so interleaving `next_label` with `model_scope` under one
    /// open scope leaves gaps in the child numbering. Strict contiguity
    /// is a non-goal.
    pub fn next_label(&self, key: &str) -> String {
        match self.contexts.top(key) {
            Ok(current) => {
                let parent = value_path(&current);
                let sibling = self.counters.next_id(&label(key, &parent));
                let mut path = parent;
                path.push(sibling);
                label(key, &path)
            }
            Err(_) => {
                let id = self.counters.next_id(DEFAULT_NAMESPACE);
                label(DEFAULT_NAMESPACE, &[id])
            }
        }
    }

    /// Integer path of the innermost open scope for `key`.
    pub fn current_path(&self, key: &str) -> Result<Vec<u64>, ContextError> {
        Ok(value_path(&self.contexts.top(key)?))
    }

    /// Raw top-of-stack value for `key`.
    pub fn current_context(&self, key: &str) -> Result<Value, ContextError> {
        self.contexts.top(key)
    }
}

/// An open numbered scope. Dropping it closes the scope.
#[derive(Debug)]
pub struct ModelScope<'a> {
    _guard: ContextGuard<'a>,
    label: String,
    path: Vec<u64>,
}

impl ModelScope<'_> {
    /// Label of this scope, e.g. `"model_1_2"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Path of this scope, e.g. `[1, 2]`. Empty for a namespace root.
    pub fn path(&self) -> &[u64] {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_child_nesting_labels() {
        let engine = NamespaceEngine::new();
        let root = engine.model_scope(DEFAULT_MODEL_NAMESPACE);
        assert_eq!(root.label(), "model");
        assert_eq!(root.path(), &[] as &[u64]);

        let child = engine.model_scope("model");
        assert_eq!(child.label(), "model_1");

        let grandchild = engine.model_scope("model");
        assert_eq!(grandchild.label(), "model_1_1");

        let great = engine.model_scope("model");
        assert_eq!(great.label(), "model_1_1_1");
    }

    #[test]
    fn test_sibling_scopes_number_sequentially() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");

        let first = engine.model_scope("model");
        assert_eq!(first.label(), "model_1");
        drop(first);

        let second = engine.model_scope("model");
        assert_eq!(second.label(), "model_2");
    }

    #[test]
    fn test_reentry_continues_sibling_counter() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");
        {
            let child = engine.model_scope("model");
            assert_eq!(child.label(), "model_1");
        }
        {
            let child = engine.model_scope("model");
            assert_eq!(child.label(), "model_2");
        }
        {
            let child = engine.model_scope("model");
            assert_eq!(child.label(), "model_3");
        }
    }

    #[test]
    fn test_sibling_buckets_are_independent() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");

        {
            let _one = engine.model_scope("model"); // model_1
            let a = engine.model_scope("model");
            assert_eq!(a.label(), "model_1_1");
        }
        {
            let _two = engine.model_scope("model"); // model_2
            let b = engine.model_scope("model");
            assert_eq!(b.label(), "model_2_1");
        }

        // resetting one bucket leaves the other untouched
        engine.counters().reset("model_1");
        let table = engine.counters().dump();
        assert_eq!(table.get("model_1"), Some(&0));
        assert_eq!(table.get("model_2"), Some(&1));
    }

    #[test]
    fn test_next_label_without_context_uses_default_namespace() {
        let engine = NamespaceEngine::new();
        assert_eq!(engine.next_label("model"), "default_1");
        assert_eq!(engine.next_label("model"), "default_2");
        assert_eq!(engine.next_label("other_key"), "default_3");
    }

    #[test]
    fn test_next_label_does_not_open_a_scope() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");
        assert_eq!(engine.contexts().depth("model"), 1);
        let _ = engine.next_label("model");
        assert_eq!(engine.contexts().depth("model"), 1);
    }

    #[test]
    fn test_next_label_then_scope_leaves_gap() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");

        assert_eq!(engine.next_label("model"), "model_1");
        // the consumed id is not reused by the next scope entry
        let child = engine.model_scope("model");
        assert_eq!(child.label(), "model_2");
    }

    #[test]
    fn test_scope_exit_pops_exactly_one_entry() {
        let engine = NamespaceEngine::new();
        let root = engine.model_scope("model");
        {
            let _child = engine.model_scope("model");
            assert_eq!(engine.contexts().depth("model"), 2);
        }
        assert_eq!(engine.contexts().depth("model"), 1);
        drop(root);
        assert_eq!(engine.contexts().depth("model"), 0);
        assert!(matches!(
            engine.current_path("model"),
            Err(ContextError::NoContext { .. })
        ));
    }

    #[test]
    fn test_current_path_tracks_innermost_scope() {
        let engine = NamespaceEngine::new();
        let _root = engine.model_scope("model");
        let _child = engine.model_scope("model");
        let _grandchild = engine.model_scope("model");
        assert_eq!(engine.current_path("model").unwrap(), vec![1, 1]);
    }

    #[test]
    fn test_numbering_coexists_with_plain_context_values() {
        let engine = NamespaceEngine::new();
        let _cfg = engine.contexts().enter("trainer", json!({"epochs": 8}));
        let _root = engine.model_scope("model");
        let child = engine.model_scope("model");
        assert_eq!(child.label(), "model_1");
        assert_eq!(
            engine.current_context("trainer").unwrap(),
            json!({"epochs": 8})
        );
    }

    #[test]
    fn test_distinct_root_keys_number_independently() {
        let engine = NamespaceEngine::new();
        let _root_a = engine.model_scope("model");
        let _root_b = engine.model_scope("search_cell");

        let a = engine.model_scope("model");
        assert_eq!(a.label(), "model_1");
        let b = engine.model_scope("search_cell");
        assert_eq!(b.label(), "search_cell_1");
    }
}
