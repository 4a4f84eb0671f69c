//! Shared storage for recurring whitespace runs
//!
//! Most prefixes in real files are a handful of distinct strings (a newline
//! plus some indentation). The interner hands out shared `Arc<str>` values
//! for them while holding only weak references itself, so it never keeps a
//! string alive that no tree uses anymore.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Weak};

/// Whitespace longer than this is rarely repeated and is not interned
const MAX_INTERNED_LEN: usize = 64;

/// Dead entries are swept after this many insertions
const PRUNE_INTERVAL: usize = 1024;

static GLOBAL: LazyLock<WhitespaceInterner> = LazyLock::new(WhitespaceInterner::new);

/// Concurrent weak-value cache of whitespace strings
#[derive(Debug, Default)]
pub struct WhitespaceInterner {
    entries: DashMap<Box<str>, Weak<str>>,
    inserts: AtomicUsize,
}

impl WhitespaceInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide interner shared by all parses
    pub fn global() -> &'static WhitespaceInterner {
        &GLOBAL
    }

    /// Return a shared copy of `text`
    pub fn intern(&self, text: &str) -> Arc<str> {
        if text.len() > MAX_INTERNED_LEN {
            return Arc::from(text);
        }

        if let Some(shared) = self.entries.get(text).and_then(|weak| weak.upgrade()) {
            return shared;
        }

        let shared: Arc<str> = Arc::from(text);
        self.entries.insert(Box::from(text), Arc::downgrade(&shared));

        if self.inserts.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.prune();
        }

        shared
    }

    /// Drop entries whose strings are no longer referenced by any tree
    pub fn prune(&self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of entries, including ones not yet pruned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_runs_share_storage() {
        let interner = WhitespaceInterner::new();
        let a = interner.intern("\n    ");
        let b = interner.intern("\n    ");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unused_strings_are_not_pinned() {
        let interner = WhitespaceInterner::new();
        let weak = {
            let shared = interner.intern("\t\t");
            Arc::downgrade(&shared)
        };
        assert!(weak.upgrade().is_none());

        interner.prune();
        assert!(interner.is_empty());
    }

    #[test]
    fn concurrent_population() {
        let interner = WhitespaceInterner::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for width in 0..32 {
                        let text = " ".repeat(width);
                        assert_eq!(&*interner.intern(&text), text.as_str());
                    }
                });
            }
        });
    }

    #[test]
    fn long_runs_bypass_the_cache() {
        let interner = WhitespaceInterner::new();
        let long = " ".repeat(MAX_INTERNED_LEN + 1);
        assert_eq!(&*interner.intern(&long), long.as_str());
        assert!(interner.is_empty());
    }
}
