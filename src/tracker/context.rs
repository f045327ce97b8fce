//! Nesting context and the shared tracker handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::tracker::key::TransactionKey;

/// Per-session bookkeeping for open savepoint operations.
#[derive(Debug, Default, Clone)]
pub struct NestingContext {
    /// Savepoint operations currently in progress.
    pub depth: usize,
    /// Commit flag per nested transaction, present only while its
    /// release or rollback is running.
    pub commit_state: HashMap<TransactionKey, bool>,
}

/// Handle to a session's [`NestingContext`].
///
/// Cloning is cheap and every clone observes the same context, so lifecycle
/// callbacks can inspect the state the emulator is mutating. A context
/// belongs to exactly one session; the lock only exists so the handle can be
/// moved to the thread that drives that session.
#[derive(Clone, Default)]
pub struct CommitTracker {
    inner: Arc<Mutex<NestingContext>>,
}

impl CommitTracker {
    /// Create a tracker with an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` has completed its commit phase. Absent keys are not
    /// committed.
    pub fn is_committed(&self, key: &TransactionKey) -> bool {
        self.inner
            .lock()
            .commit_state
            .get(key)
            .copied()
            .unwrap_or(false)
    }

    /// Record the commit flag for `key`, overwriting any previous value.
    pub fn mark_committed(&self, key: &TransactionKey, committed: bool) {
        self.inner.lock().commit_state.insert(key.clone(), committed);
    }

    /// Drop the entry for `key`. Clearing an absent key does nothing.
    pub fn clear(&self, key: &TransactionKey) {
        self.inner.lock().commit_state.remove(key);
    }

    /// Whether an entry currently exists for `key`.
    pub fn contains(&self, key: &TransactionKey) -> bool {
        self.inner.lock().commit_state.contains_key(key)
    }

    /// Number of savepoint operations in progress.
    pub fn depth(&self) -> usize {
        self.inner.lock().depth
    }

    /// Open one nesting level and return the new depth.
    pub fn enter(&self) -> usize {
        let mut ctx = self.inner.lock();
        ctx.depth += 1;
        ctx.depth
    }

    /// Close one nesting level and return the new depth.
    pub fn exit(&self) -> usize {
        let mut ctx = self.inner.lock();
        ctx.depth = ctx.depth.saturating_sub(1);
        ctx.depth
    }

    /// Number of keys with a live entry.
    pub fn len(&self) -> usize {
        self.inner.lock().commit_state.len()
    }

    /// True when no key has a live entry.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().commit_state.is_empty()
    }

    /// Drop every entry and zero the depth.
    ///
    /// For harnesses tearing down between tests; never called by the
    /// emulator itself.
    pub fn reset(&self) {
        let mut ctx = self.inner.lock();
        ctx.depth = 0;
        ctx.commit_state.clear();
    }

    /// Copy of the current context, for diagnostics.
    pub fn snapshot(&self) -> NestingContext {
        self.inner.lock().clone()
    }
}

impl std::fmt::Debug for CommitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ctx = self.inner.lock();
        f.debug_struct("CommitTracker")
            .field("depth", &ctx.depth)
            .field("entries", &ctx.commit_state.len())
            .finish()
    }
}
