//! Lifecycle notifications and the callback seam.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle notification fired around a savepoint release or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    BeforeCommit,
    BeforeCommitOnCreate,
    BeforeCommitOnSave,
    BeforeCommitOnUpdate,
    BeforeCommitOnDestroy,
    AfterCommit,
    AfterCommitOnCreate,
    AfterCommitOnSave,
    AfterCommitOnUpdate,
    AfterCommitOnDestroy,
    BeforeRollback,
    AfterRollback,
}

impl Notification {
    /// Fired in this order before the savepoint is released.
    pub const BEFORE_COMMIT: [Notification; 5] = [
        Notification::BeforeCommit,
        Notification::BeforeCommitOnCreate,
        Notification::BeforeCommitOnSave,
        Notification::BeforeCommitOnUpdate,
        Notification::BeforeCommitOnDestroy,
    ];

    /// Fired in this order once the release succeeded.
    pub const AFTER_COMMIT: [Notification; 5] = [
        Notification::AfterCommit,
        Notification::AfterCommitOnCreate,
        Notification::AfterCommitOnSave,
        Notification::AfterCommitOnUpdate,
        Notification::AfterCommitOnDestroy,
    ];

    pub fn is_commit(&self) -> bool {
        !matches!(
            self,
            Notification::BeforeRollback | Notification::AfterRollback
        )
    }

    pub fn is_rollback(&self) -> bool {
        !self.is_commit()
    }

    /// Callback name as the record layer knows it.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::BeforeCommit => "before_commit",
            Notification::BeforeCommitOnCreate => "before_commit_on_create",
            Notification::BeforeCommitOnSave => "before_commit_on_save",
            Notification::BeforeCommitOnUpdate => "before_commit_on_update",
            Notification::BeforeCommitOnDestroy => "before_commit_on_destroy",
            Notification::AfterCommit => "after_commit",
            Notification::AfterCommitOnCreate => "after_commit_on_create",
            Notification::AfterCommitOnSave => "after_commit_on_save",
            Notification::AfterCommitOnUpdate => "after_commit_on_update",
            Notification::AfterCommitOnDestroy => "after_commit_on_destroy",
            Notification::BeforeRollback => "before_rollback",
            Notification::AfterRollback => "after_rollback",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver of lifecycle notifications, usually the record layer.
///
/// Implementations must accept being notified when nothing is pending. An
/// error aborts the remainder of the current phase.
pub trait LifecycleCallbacks {
    type Error: std::error::Error + Send + Sync + 'static;

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error>;
}

/// Callbacks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallbacks;

impl LifecycleCallbacks for NoCallbacks {
    type Error = std::convert::Infallible;

    fn notify(&mut self, _notification: Notification) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: LifecycleCallbacks + ?Sized> LifecycleCallbacks for Box<T> {
    type Error = T::Error;

    fn notify(&mut self, notification: Notification) -> Result<(), Self::Error> {
        (**self).notify(notification)
    }
}
