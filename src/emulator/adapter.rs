//! Collaborator seams: the savepoint adapter and the cleanup hook.

use crate::tracker::TransactionKey;

/// The savepoint primitives of a connection adapter.
///
/// [`SavepointEmulator`](crate::emulator::SavepointEmulator) implements this
/// trait too, so it can stand in wherever the plain adapter is expected.
pub trait SavepointAdapter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Physically release the current savepoint.
    fn release_savepoint(&mut self) -> Result<(), Self::Error>;

    /// Physically roll back to the current savepoint.
    fn rollback_to_savepoint(&mut self) -> Result<(), Self::Error>;

    /// Key for the savepoint about to be released or rolled back.
    ///
    /// Must return the same key for the duration of one operation and
    /// different keys for different nesting levels.
    fn unique_transaction_key(&self) -> TransactionKey;
}

impl<T: SavepointAdapter + ?Sized> SavepointAdapter for Box<T> {
    type Error = T::Error;

    fn release_savepoint(&mut self) -> Result<(), Self::Error> {
        (**self).release_savepoint()
    }

    fn rollback_to_savepoint(&mut self) -> Result<(), Self::Error> {
        (**self).rollback_to_savepoint()
    }

    fn unique_transaction_key(&self) -> TransactionKey {
        (**self).unique_transaction_key()
    }
}

/// Clears per-context callback registries once a savepoint operation ends.
///
/// Runs after every release and rollback, whatever the outcome. The call is
/// made from a drop guard: a panic raised here is re-raised once the tracker
/// entry is cleared and the depth restored, unless the operation is already
/// unwinding from another panic, in which case it is logged and discarded.
pub trait CleanupHook {
    fn cleanup(&mut self, key: &TransactionKey);
}

impl<F> CleanupHook for F
where
    F: FnMut(&TransactionKey),
{
    fn cleanup(&mut self, key: &TransactionKey) {
        self(key)
    }
}

/// Cleanup hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCleanup;

impl CleanupHook for NoCleanup {
    fn cleanup(&mut self, _key: &TransactionKey) {}
}
