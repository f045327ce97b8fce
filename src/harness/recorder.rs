//! Recording callbacks and cleanup hooks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::emulator::{CleanupHook, LifecycleCallbacks, Notification};
use crate::tracker::{CommitTracker, TransactionKey};

/// Failure scripted with [`RecordingCallbacks::fail_on`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback {notification} failed")]
pub struct CallbackError {
    pub notification: Notification,
}

/// One notification as seen by [`RecordingCallbacks`].
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub notification: Notification,
    /// Nesting depth when the notification fired; 0 without a tracker.
    pub depth: usize,
    /// Commit flags when the notification fired; empty without a tracker.
    pub commit_state: HashMap<TransactionKey, bool>,
}

#[derive(Default)]
struct RecorderState {
    events: Vec<NotificationEvent>,
    fail_on: Option<Notification>,
}

/// Records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    state: Arc<Mutex<RecorderState>>,
    tracker: Option<CommitTracker>,
}

impl RecordingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also snapshot `tracker` at every notification.
    pub fn observing(tracker: CommitTracker) -> Self {
        Self {
            state: Arc::default(),
            tracker: Some(tracker),
        }
    }

    /// Fail, after recording, whenever `notification` fires.
    pub fn fail_on(&self, notification: Notification) {
        self.state.lock().fail_on = Some(notification);
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.state.lock().events.clone()
    }

    /// Notifications in the order they fired.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state
            .lock()
            .events
            .iter()
            .map(|event| event.notification)
            .collect()
    }

    /// How many times `notification` fired.
    pub fn count(&self, notification: Notification) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|event| event.notification == notification)
            .count()
    }

    /// Forget recorded events. A scripted failure stays in place.
    pub fn clear(&self) {
        self.state.lock().events.clear();
    }
}

impl LifecycleCallbacks for RecordingCallbacks {
    type Error = CallbackError;

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error> {
        let (depth, commit_state) = match &self.tracker {
            Some(tracker) => {
                let ctx = tracker.snapshot();
                (ctx.depth, ctx.commit_state)
            }
            None => (0, HashMap::new()),
        };

        let mut state = self.state.lock();
        state.events.push(NotificationEvent {
            notification,
            depth,
            commit_state,
        });
        if state.fail_on == Some(notification) {
            return Err(CallbackError { notification });
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordingCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingCallbacks")
            .field("events", &self.state.lock().events.len())
            .finish()
    }
}

/// Adapts a closure into [`LifecycleCallbacks`].
pub struct FnCallbacks<F> {
    f: F,
}

impl<F> FnCallbacks<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, E> LifecycleCallbacks for FnCallbacks<F>
where
    F: FnMut(Notification) -> Result<(), E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error> {
        (self.f)(notification)
    }
}

/// Cleanup hook that records the keys it was called for.
#[derive(Debug, Clone, Default)]
pub struct RecordingCleanup {
    keys: Arc<Mutex<Vec<TransactionKey>>>,
}

impl RecordingCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys cleaned up, in order.
    pub fn keys(&self) -> Vec<TransactionKey> {
        self.keys.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.keys.lock().len()
    }
}

impl CleanupHook for RecordingCleanup {
    fn cleanup(&mut self, key: &TransactionKey) {
        self.keys.lock().push(key.clone());
    }
}
