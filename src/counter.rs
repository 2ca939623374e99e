//! Per-namespace unique-id counters.
//!
//! Namespaces are plain strings; equal strings share a counter. A counter
//! is created at 0 on first use, incremented by `next_id` (so the first
//! id handed out is 1), and reset only explicitly. Entries are never
//! removed.
//!
//! Not safe for concurrent mutation: `RefCell` makes the registry
//! `!Sync`; callers serialize access externally if needed.

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Fallback namespace used when an id is requested with no open context.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Registry of per-namespace monotonic counters.
#[derive(Debug, Default)]
pub struct UidRegistry {
    counters: RefCell<BTreeMap<String, u64>>,
}

impl UidRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the counter for `namespace`.
    /// The first call after creation or `reset` returns 1.
    pub fn next_id(&self, namespace: &str) -> u64 {
        let mut counters = self.counters.borrow_mut();
        let entry = counters.entry(namespace.to_string()).or_insert(0);
        *entry = match entry.checked_add(1) {
            Some(next) => next,
            None => panic!("Overflow: counter for {:?} exceeds u64", namespace),
        };
        *entry
    }

    /// Set the counter for `namespace` to 0.
    pub fn reset(&self, namespace: &str) {
        log::trace!("reset counter for namespace {:?}", namespace);
        self.counters
            .borrow_mut()
            .insert(namespace.to_string(), 0);
    }

    /// Copy of the full counter table, sorted by namespace.
    pub fn dump(&self) -> BTreeMap<String, u64> {
        self.counters.borrow().clone()
    }

    /// Rebuild a registry from a counter table (snapshot restore).
    pub fn from_entries(entries: BTreeMap<String, u64>) -> Self {
        Self {
            counters: RefCell::new(entries),
        }
    }
}
