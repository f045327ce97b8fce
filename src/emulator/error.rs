//! Emulator error types.

use thiserror::Error;

use crate::emulator::config::ConfigError;
use crate::emulator::notification::Notification;
use crate::tracker::TransactionKey;

/// Boxed error from an external collaborator (adapter or callbacks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for emulator operations.
pub type EmulatorResult<T> = Result<T, EmulatorError>;

/// Errors surfaced by [`SavepointEmulator`](crate::emulator::SavepointEmulator).
///
/// Bookkeeping (cleanup, commit-state clear, depth) has always completed by
/// the time one of these reaches the caller.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// The adapter failed to release the savepoint.
    #[error("release of savepoint {key} failed: {source}")]
    ReleaseFailed {
        key: TransactionKey,
        #[source]
        source: BoxError,
    },

    /// The adapter failed to roll back to the savepoint.
    #[error("rollback to savepoint {key} failed: {source}")]
    RollbackFailed {
        key: TransactionKey,
        #[source]
        source: BoxError,
    },

    /// A lifecycle callback failed; the rest of its phase was skipped.
    #[error("{notification} callback failed for {key}: {source}")]
    Notification {
        notification: Notification,
        key: TransactionKey,
        #[source]
        source: BoxError,
    },

    /// Invalid emulator configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EmulatorError {
    /// Whether the underlying savepoint primitive failed.
    pub fn is_primitive_failure(&self) -> bool {
        matches!(
            self,
            EmulatorError::ReleaseFailed { .. } | EmulatorError::RollbackFailed { .. }
        )
    }

    /// The notification that failed, if any.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            EmulatorError::Notification { notification, .. } => Some(*notification),
            _ => None,
        }
    }

    /// Key of the savepoint operation that failed.
    pub fn key(&self) -> Option<&TransactionKey> {
        match self {
            EmulatorError::ReleaseFailed { key, .. }
            | EmulatorError::RollbackFailed { key, .. }
            | EmulatorError::Notification { key, .. } => Some(key),
            EmulatorError::Config(_) => None,
        }
    }
}
