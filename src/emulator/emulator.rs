//! The savepoint decorator that fires transaction lifecycle notifications.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::emulator::adapter::{CleanupHook, NoCleanup, SavepointAdapter};
use crate::emulator::config::{CommittedRollback, EmulatorConfig};
use crate::emulator::error::{EmulatorError, EmulatorResult};
use crate::emulator::notification::{LifecycleCallbacks, NoCallbacks, Notification};
use crate::tracker::{CommitTracker, TransactionKey};

/// How a [`SavepointEmulator::rollback_to`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// Rollback notifications fired and the savepoint was rolled back.
    RolledBack,
    /// The key was already committed; nothing was done.
    SkippedCommitted,
    /// The key was already committed; the savepoint was rolled back
    /// without notifications.
    PhysicalOnly,
}

impl RollbackOutcome {
    pub fn notified(&self) -> bool {
        matches!(self, RollbackOutcome::RolledBack)
    }
}

/// Wraps a [`SavepointAdapter`] so that releasing a savepoint behaves like a
/// commit and rolling back behaves like a rollback, as far as lifecycle
/// callbacks are concerned.
///
/// Every operation is bracketed by an operation scope: the nesting depth
/// goes up on entry, and on any exit the cleanup hook runs, the key's commit
/// state is cleared and the depth goes back down.
pub struct SavepointEmulator<A, C = NoCallbacks, H = NoCleanup> {
    adapter: A,
    callbacks: C,
    cleanup: H,
    tracker: CommitTracker,
    config: EmulatorConfig,
}

impl<A: SavepointAdapter> SavepointEmulator<A> {
    /// Wrap an adapter with no callbacks and no cleanup hook.
    pub fn bare(adapter: A) -> Self {
        Self::new(adapter, NoCallbacks, NoCleanup)
    }
}

impl<A, C, H> SavepointEmulator<A, C, H>
where
    A: SavepointAdapter,
    C: LifecycleCallbacks,
    H: CleanupHook,
{
    /// Wrap `adapter`, firing `callbacks` and running `cleanup` after each
    /// operation.
    pub fn new(adapter: A, callbacks: C, cleanup: H) -> Self {
        Self {
            adapter,
            callbacks,
            cleanup,
            tracker: CommitTracker::new(),
            config: EmulatorConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EmulatorConfig) -> EmulatorResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Share an existing nesting context instead of the private one.
    pub fn with_tracker(mut self, tracker: CommitTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Release the savepoint identified by `key`, firing commit notifications.
    ///
    /// Before-commit notifications fire even if the release later fails; the
    /// after-commit notifications only fire once the adapter released the
    /// savepoint, at which point the key reads as committed.
    pub fn release(&mut self, key: &TransactionKey) -> EmulatorResult<()> {
        let _span =
            tracing::debug_span!("release", label = %self.config.label, %key).entered();
        let scope = OperationScope::enter(&self.tracker, &mut self.cleanup, key);
        debug!(depth = scope.depth, "releasing savepoint");

        self.tracker.mark_committed(key, false);
        fire(&mut self.callbacks, key, &Notification::BEFORE_COMMIT)?;

        if let Err(e) = self.adapter.release_savepoint() {
            warn!(error = %e, "savepoint release failed");
            return Err(EmulatorError::ReleaseFailed {
                key: key.clone(),
                source: Box::new(e),
            });
        }

        self.tracker.mark_committed(key, true);
        fire(&mut self.callbacks, key, &Notification::AFTER_COMMIT)?;

        debug!("savepoint released");
        Ok(())
    }

    /// Roll back to the savepoint identified by `key`, firing rollback
    /// notifications.
    ///
    /// A key whose release is still in progress and already reads as
    /// committed gets no rollback notifications; see [`CommittedRollback`] for
    /// what happens to the physical rollback then. Nothing is remembered
    /// once an operation ends, so a later savepoint reusing the key rolls
    /// back normally.
    pub fn rollback_to(&mut self, key: &TransactionKey) -> EmulatorResult<RollbackOutcome> {
        let _span =
            tracing::debug_span!("rollback", label = %self.config.label, %key).entered();
        let scope = OperationScope::enter(&self.tracker, &mut self.cleanup, key);

        if self.tracker.is_committed(key) {
            return match self.config.committed_rollback {
                CommittedRollback::Skip => {
                    debug!("savepoint already committed, skipping rollback");
                    Ok(RollbackOutcome::SkippedCommitted)
                }
                CommittedRollback::Physical => {
                    debug!("savepoint already committed, rolling back without notifications");
                    rollback_primitive(&mut self.adapter, key)?;
                    Ok(RollbackOutcome::PhysicalOnly)
                }
            };
        }

        debug!(depth = scope.depth, "rolling back savepoint");
        fire(&mut self.callbacks, key, &[Notification::BeforeRollback])?;
        rollback_primitive(&mut self.adapter, key)?;
        fire(&mut self.callbacks, key, &[Notification::AfterRollback])?;

        debug!("savepoint rolled back");
        Ok(RollbackOutcome::RolledBack)
    }

    /// Release the adapter's current savepoint.
    pub fn release_current(&mut self) -> EmulatorResult<()> {
        let key = self.adapter.unique_transaction_key();
        self.release(&key)
    }

    /// Roll back to the adapter's current savepoint.
    pub fn rollback_current(&mut self) -> EmulatorResult<RollbackOutcome> {
        let key = self.adapter.unique_transaction_key();
        self.rollback_to(&key)
    }

    /// Whether `key` is currently recorded as committed.
    pub fn is_committed(&self, key: &TransactionKey) -> bool {
        self.tracker.is_committed(key)
    }

    /// Number of savepoint operations in progress.
    pub fn depth(&self) -> usize {
        self.tracker.depth()
    }

    pub fn tracker(&self) -> &CommitTracker {
        &self.tracker
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    /// Unwrap the decorator, returning the adapter.
    pub fn into_inner(self) -> A {
        self.adapter
    }
}

impl<A, C, H> SavepointAdapter for SavepointEmulator<A, C, H>
where
    A: SavepointAdapter,
    C: LifecycleCallbacks,
    H: CleanupHook,
{
    type Error = EmulatorError;

    fn release_savepoint(&mut self) -> Result<(), Self::Error> {
        self.release_current()
    }

    fn rollback_to_savepoint(&mut self) -> Result<(), Self::Error> {
        self.rollback_current().map(|_| ())
    }

    fn unique_transaction_key(&self) -> TransactionKey {
        self.adapter.unique_transaction_key()
    }
}

impl<A, C, H> std::fmt::Debug for SavepointEmulator<A, C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavepointEmulator")
            .field("label", &self.config.label)
            .field("tracker", &self.tracker)
            .finish()
    }
}

/// Bookkeeping for one release or rollback.
///
/// Dropping the scope runs the cleanup hook, clears the key and closes the
/// nesting level, in that order. This happens on early returns and panics
/// alike. A panicking hook does not skip the clear or the decrement; its
/// panic is re-raised afterwards, or logged and dropped if the scope is
/// already unwinding from another panic.
struct OperationScope<'a, H: CleanupHook> {
    tracker: &'a CommitTracker,
    cleanup: &'a mut H,
    key: &'a TransactionKey,
    depth: usize,
}

impl<'a, H: CleanupHook> OperationScope<'a, H> {
    fn enter(tracker: &'a CommitTracker, cleanup: &'a mut H, key: &'a TransactionKey) -> Self {
        let depth = tracker.enter();
        Self {
            tracker,
            cleanup,
            key,
            depth,
        }
    }
}

impl<H: CleanupHook> Drop for OperationScope<'_, H> {
    fn drop(&mut self) {
        let cleanup = &mut *self.cleanup;
        let key = self.key;
        let hook = panic::catch_unwind(AssertUnwindSafe(|| cleanup.cleanup(key)));

        self.tracker.clear(key);
        let depth = self.tracker.exit();
        trace!(%key, depth, "savepoint operation closed");

        if let Err(payload) = hook {
            if std::thread::panicking() {
                warn!(%key, "cleanup hook panicked while unwinding");
            } else {
                panic::resume_unwind(payload);
            }
        }
    }
}

/// Fire `phase` in order, stopping at the first failing callback.
fn fire<C: LifecycleCallbacks>(
    callbacks: &mut C,
    key: &TransactionKey,
    phase: &[Notification],
) -> EmulatorResult<()> {
    for &notification in phase {
        trace!(%notification, "notify");
        callbacks
            .notify(notification)
            .map_err(|e| EmulatorError::Notification {
                notification,
                key: key.clone(),
                source: Box::new(e),
            })?;
    }
    Ok(())
}

fn rollback_primitive<A: SavepointAdapter>(
    adapter: &mut A,
    key: &TransactionKey,
) -> EmulatorResult<()> {
    adapter.rollback_to_savepoint().map_err(|e| {
        warn!(error = %e, "savepoint rollback failed");
        EmulatorError::RollbackFailed {
            key: key.clone(),
            source: Box::new(e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{MemoryAdapter, RecordingCallbacks, RecordingCleanup};
    use proptest::prelude::*;

    type Emulator = SavepointEmulator<MemoryAdapter, RecordingCallbacks, RecordingCleanup>;

    fn setup() -> (Emulator, RecordingCallbacks, RecordingCleanup) {
        let tracker = CommitTracker::new();
        let callbacks = RecordingCallbacks::observing(tracker.clone());
        let cleanup = RecordingCleanup::new();
        let emulator =
            SavepointEmulator::new(MemoryAdapter::new(), callbacks.clone(), cleanup.clone())
                .with_tracker(tracker);
        (emulator, callbacks, cleanup)
    }

    fn key(name: &str) -> TransactionKey {
        TransactionKey::new(name).unwrap()
    }

    #[test]
    fn test_release_fires_commit_sequence() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();

        emulator.release(&k).unwrap();

        let expected: Vec<_> = Notification::BEFORE_COMMIT
            .iter()
            .chain(Notification::AFTER_COMMIT.iter())
            .copied()
            .collect();
        assert_eq!(callbacks.notifications(), expected);
        assert_eq!(emulator.adapter().releases(), 1);
        assert_eq!(cleanup.keys(), vec![k.clone()]);
        assert!(!emulator.tracker().contains(&k));
        assert_eq!(emulator.depth(), 0);
    }

    #[test]
    fn test_commit_flag_visible_only_after_release() {
        let (mut emulator, callbacks, _cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();

        emulator.release(&k).unwrap();

        for event in callbacks.events() {
            let committed = event.commit_state.get(&k).copied();
            if event.notification.name().starts_with("before") {
                assert_eq!(committed, Some(false), "{}", event.notification);
            } else {
                assert_eq!(committed, Some(true), "{}", event.notification);
            }
            assert_eq!(event.depth, 1);
        }
    }

    #[test]
    fn test_rollback_fires_rollback_sequence() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();

        let outcome = emulator.rollback_to(&k).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(
            callbacks.notifications(),
            vec![Notification::BeforeRollback, Notification::AfterRollback]
        );
        assert_eq!(emulator.adapter().rollbacks(), 1);
        assert_eq!(cleanup.count(), 1);
        assert!(emulator.tracker().is_empty());
    }

    #[test]
    fn test_rollback_never_marks_committed() {
        let (mut emulator, callbacks, _cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();

        emulator.rollback_to(&k).unwrap();

        assert!(callbacks
            .events()
            .iter()
            .all(|event| event.commit_state.get(&k) != Some(&true)));
    }

    #[test]
    fn test_rollback_of_committed_key_is_skipped() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = key("sp1");
        emulator.tracker().mark_committed(&k, true);

        let outcome = emulator.rollback_to(&k).unwrap();

        assert_eq!(outcome, RollbackOutcome::SkippedCommitted);
        assert!(!outcome.notified());
        assert!(callbacks.notifications().is_empty());
        assert_eq!(emulator.adapter().rollbacks(), 0);
        assert_eq!(cleanup.keys(), vec![k.clone()]);
        assert!(!emulator.tracker().contains(&k));
    }

    #[test]
    fn test_physical_policy_rolls_back_silently() {
        let (emulator, callbacks, _cleanup) = setup();
        let mut emulator = emulator
            .with_config(EmulatorConfig::default().committed_rollback(CommittedRollback::Physical))
            .unwrap();
        let k = emulator.adapter_mut().open_savepoint();
        emulator.tracker().mark_committed(&k, true);

        let outcome = emulator.rollback_to(&k).unwrap();

        assert_eq!(outcome, RollbackOutcome::PhysicalOnly);
        assert!(callbacks.notifications().is_empty());
        assert_eq!(emulator.adapter().rollbacks(), 1);
        assert!(emulator.tracker().is_empty());
    }

    /// Adapter whose key only depends on the nesting level, so consecutive
    /// savepoints at the same level share a key.
    #[derive(Default)]
    struct LevelAdapter {
        level: usize,
        releases: usize,
        rollbacks: usize,
    }

    impl SavepointAdapter for LevelAdapter {
        type Error = std::convert::Infallible;

        fn release_savepoint(&mut self) -> Result<(), Self::Error> {
            self.releases += 1;
            Ok(())
        }

        fn rollback_to_savepoint(&mut self) -> Result<(), Self::Error> {
            self.rollbacks += 1;
            Ok(())
        }

        fn unique_transaction_key(&self) -> TransactionKey {
            key(&format!("sp_{}", self.level))
        }
    }

    #[test]
    fn test_reused_level_key_rolls_back_after_release() {
        let tracker = CommitTracker::new();
        let callbacks = RecordingCallbacks::new();
        let mut emulator =
            SavepointEmulator::new(LevelAdapter::default(), callbacks.clone(), NoCleanup)
                .with_tracker(tracker.clone());

        emulator.adapter_mut().level = 1;
        emulator.release_current().unwrap();
        assert!(tracker.snapshot().commit_state.is_empty());

        callbacks.clear();
        emulator.adapter_mut().level = 1;
        let outcome = emulator.rollback_current().unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(
            callbacks.notifications(),
            vec![Notification::BeforeRollback, Notification::AfterRollback]
        );
        assert_eq!(emulator.adapter().releases, 1);
        assert_eq!(emulator.adapter().rollbacks, 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_long_session_keeps_context_empty() {
        let mut emulator = SavepointEmulator::bare(MemoryAdapter::new());

        for _ in 0..1000 {
            let k = emulator.adapter_mut().open_savepoint();
            emulator.release(&k).unwrap();

            let ctx = emulator.tracker().snapshot();
            assert_eq!(ctx.depth, 0);
            assert!(ctx.commit_state.is_empty());
        }
        assert_eq!(emulator.adapter().releases(), 1000);
    }

    #[test]
    fn test_rollback_nested_inside_release_is_skipped() {
        // An inner rollback for a key whose release already succeeded, issued
        // from an after-commit callback while the release is still open.
        let tracker = CommitTracker::new();
        let k = key("outer");
        let cleanup = RecordingCleanup::new();

        let inner = std::rc::Rc::new(std::cell::RefCell::new(None));
        let inner_result = inner.clone();
        let inner_tracker = tracker.clone();
        let inner_key = k.clone();
        let callbacks = crate::harness::FnCallbacks::new(move |n: Notification| {
            if n == Notification::AfterCommit {
                let mut nested = SavepointEmulator::bare(MemoryAdapter::new())
                    .with_tracker(inner_tracker.clone());
                let outcome = nested.rollback_to(&inner_key).map_err(|e| e.to_string());
                *inner_result.borrow_mut() = Some((outcome, nested.adapter().rollbacks()));
            }
            Ok::<(), std::convert::Infallible>(())
        });
        let mut emulator =
            SavepointEmulator::new(MemoryAdapter::new(), callbacks, cleanup.clone())
                .with_tracker(tracker.clone());
        emulator.adapter_mut().open_savepoint();

        emulator.release(&k).unwrap();

        let (outcome, rollbacks) = inner.borrow_mut().take().unwrap();
        assert_eq!(outcome, Ok(RollbackOutcome::SkippedCommitted));
        assert_eq!(rollbacks, 0);
        assert!(tracker.is_empty());
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_release_failure_skips_after_commit() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();
        emulator.adapter_mut().fail_next_release("disk full");

        let err = emulator.release(&k).unwrap_err();

        assert!(err.is_primitive_failure());
        assert_eq!(err.key(), Some(&k));
        assert_eq!(callbacks.notifications(), Notification::BEFORE_COMMIT.to_vec());
        assert_eq!(cleanup.keys(), vec![k.clone()]);
        assert!(!emulator.tracker().contains(&k));
        assert_eq!(emulator.depth(), 0);
    }

    #[test]
    fn test_rollback_failure_skips_after_rollback() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();
        emulator.adapter_mut().fail_next_rollback("lost connection");

        let err = emulator.rollback_to(&k).unwrap_err();

        assert!(matches!(err, EmulatorError::RollbackFailed { .. }));
        assert_eq!(callbacks.notifications(), vec![Notification::BeforeRollback]);
        assert_eq!(cleanup.count(), 1);
        assert_eq!(emulator.depth(), 0);
    }

    #[test]
    fn test_callback_failure_aborts_phase() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();
        callbacks.fail_on(Notification::BeforeCommitOnSave);

        let err = emulator.release(&k).unwrap_err();

        assert_eq!(err.notification(), Some(Notification::BeforeCommitOnSave));
        assert_eq!(
            callbacks.notifications(),
            vec![
                Notification::BeforeCommit,
                Notification::BeforeCommitOnCreate,
                Notification::BeforeCommitOnSave,
            ]
        );
        assert_eq!(emulator.adapter().releases(), 0);
        assert_eq!(cleanup.count(), 1);
        assert!(emulator.tracker().is_empty());
        assert_eq!(emulator.depth(), 0);
    }

    #[test]
    fn test_after_commit_failure_keeps_release() {
        let (mut emulator, callbacks, _cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();
        callbacks.fail_on(Notification::AfterCommit);

        let err = emulator.release(&k).unwrap_err();

        assert_eq!(err.notification(), Some(Notification::AfterCommit));
        assert_eq!(emulator.adapter().releases(), 1);
        assert_eq!(callbacks.count(Notification::AfterCommitOnCreate), 0);
        assert!(emulator.tracker().is_empty());
    }

    #[test]
    fn test_failure_does_not_leak_into_next_release() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k2 = emulator.adapter_mut().open_savepoint();
        let k1 = emulator.adapter_mut().open_savepoint();
        emulator.adapter_mut().fail_next_release("boom");

        assert!(emulator.release(&k1).is_err());
        callbacks.clear();
        emulator.release(&k2).unwrap();

        assert_eq!(callbacks.notifications().len(), 10);
        for event in callbacks.events() {
            assert!(!event.commit_state.contains_key(&k1));
        }
        assert_eq!(cleanup.keys(), vec![k1, k2]);
        assert!(emulator.tracker().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (emulator, _callbacks, _cleanup) = setup();
        let err = emulator.with_config(EmulatorConfig::new(" ")).unwrap_err();
        assert!(matches!(err, EmulatorError::Config(_)));
    }

    #[test]
    fn test_decorator_uses_adapter_key() {
        let (mut emulator, callbacks, cleanup) = setup();
        let k = emulator.adapter_mut().open_savepoint();
        assert_eq!(emulator.unique_transaction_key(), k);

        emulator.release_savepoint().unwrap();
        let inner = emulator.adapter_mut().open_savepoint();
        emulator.rollback_to_savepoint().unwrap();

        assert_eq!(cleanup.keys(), vec![k, inner]);
        assert_eq!(callbacks.count(Notification::AfterCommit), 1);
        assert_eq!(callbacks.count(Notification::AfterRollback), 1);
    }

    #[test]
    fn test_panicking_callback_still_cleans_up() {
        let tracker = CommitTracker::new();
        let cleanup = RecordingCleanup::new();
        let k = key("sp1");
        let callbacks = crate::harness::FnCallbacks::new(|n: Notification| {
            if n == Notification::BeforeCommitOnUpdate {
                panic!("callback panicked");
            }
            Ok::<(), std::convert::Infallible>(())
        });
        let mut emulator =
            SavepointEmulator::new(MemoryAdapter::new(), callbacks, cleanup.clone())
                .with_tracker(tracker.clone());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = emulator.release(&k);
        }));

        assert!(result.is_err());
        assert_eq!(cleanup.keys(), vec![k]);
        assert!(tracker.is_empty());
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_panicking_cleanup_hook_still_balances_depth() {
        let tracker = CommitTracker::new();
        let k = key("sp1");
        let hook = |_: &TransactionKey| {
            panic!("cleanup hook panicked");
        };
        let mut emulator = SavepointEmulator::new(MemoryAdapter::new(), NoCallbacks, hook)
            .with_tracker(tracker.clone());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = emulator.release(&k);
        }));

        assert!(result.is_err());
        assert!(tracker.is_empty());
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_cleanup_hook_panic_during_unwind_does_not_abort() {
        let tracker = CommitTracker::new();
        let k = key("sp1");
        let callbacks = crate::harness::FnCallbacks::new(|n: Notification| {
            if n == Notification::BeforeCommit {
                panic!("callback panicked");
            }
            Ok::<(), std::convert::Infallible>(())
        });
        let hook = |_: &TransactionKey| {
            panic!("cleanup hook panicked");
        };
        let mut emulator = SavepointEmulator::new(MemoryAdapter::new(), callbacks, hook)
            .with_tracker(tracker.clone());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = emulator.release(&k);
        }));

        assert!(result.is_err());
        assert!(tracker.is_empty());
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_sessions_on_separate_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let (mut emulator, callbacks, _cleanup) = setup();
                    for _ in 0..8 {
                        let k = emulator.adapter_mut().open_savepoint();
                        emulator.release(&k).unwrap();
                        assert!(emulator.tracker().snapshot().commit_state.is_empty());
                    }
                    callbacks.count(Notification::AfterCommitOnDestroy)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 8);
        }
    }

    proptest! {
        #[test]
        fn prop_depth_balanced(
            ops in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..24)
        ) {
            let (mut emulator, _callbacks, cleanup) = setup();
            for (release, fail) in &ops {
                let k = emulator.adapter_mut().open_savepoint();
                if *release {
                    if *fail {
                        emulator.adapter_mut().fail_next_release("injected");
                    }
                    let _ = emulator.release(&k);
                } else {
                    if *fail {
                        emulator.adapter_mut().fail_next_rollback("injected");
                    }
                    let _ = emulator.rollback_to(&k);
                }
                prop_assert_eq!(emulator.depth(), 0);
                prop_assert!(!emulator.tracker().contains(&k));
            }
            prop_assert_eq!(cleanup.count(), ops.len());
        }

        #[test]
        fn prop_committed_rollback_fires_nothing(name in "[a-z][a-z0-9_]{0,15}") {
            let (mut emulator, callbacks, _cleanup) = setup();
            let k = key(&name);
            emulator.tracker().mark_committed(&k, true);

            let outcome = emulator.rollback_to(&k).unwrap();
            prop_assert_eq!(outcome, RollbackOutcome::SkippedCommitted);
            prop_assert!(callbacks.notifications().is_empty());
            prop_assert_eq!(emulator.adapter().rollbacks(), 0);
        }

        #[test]
        fn prop_uncommitted_rollback_fires_once(name in "[a-z][a-z0-9_]{0,15}") {
            let (mut emulator, callbacks, _cleanup) = setup();
            let k = key(&name);

            emulator.rollback_to(&k).unwrap();

            prop_assert_eq!(callbacks.count(Notification::BeforeRollback), 1);
            prop_assert_eq!(callbacks.count(Notification::AfterRollback), 1);
            prop_assert!(callbacks.notifications().iter().all(Notification::is_rollback));
        }
    }
}
