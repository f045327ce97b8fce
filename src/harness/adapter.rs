//! A savepoint adapter that keeps its savepoints in memory.

use thiserror::Error;

use crate::emulator::SavepointAdapter;
use crate::tracker::TransactionKey;

/// Errors produced by [`MemoryAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryAdapterError {
    /// A failure scripted with `fail_next_release` / `fail_next_rollback`.
    #[error("injected failure: {0}")]
    Injected(String),
}

/// In-memory savepoint stack.
///
/// `release_savepoint` and `rollback_to_savepoint` pop the innermost open
/// savepoint (if any) and count the call. Either can be scripted to fail once.
#[derive(Debug)]
pub struct MemoryAdapter {
    open: Vec<TransactionKey>,
    base_key: TransactionKey,
    releases: usize,
    rollbacks: usize,
    fail_release: Option<String>,
    fail_rollback: Option<String>,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self {
            open: Vec::new(),
            base_key: TransactionKey::generate(),
            releases: 0,
            rollbacks: 0,
            fail_release: None,
            fail_rollback: None,
        }
    }

    /// Open a savepoint and return its key.
    pub fn open_savepoint(&mut self) -> TransactionKey {
        let key = TransactionKey::generate();
        self.open.push(key.clone());
        key
    }

    /// Number of savepoints currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Successful physical releases so far.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Successful physical rollbacks so far.
    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    /// Make the next release fail with `reason`.
    pub fn fail_next_release(&mut self, reason: impl Into<String>) {
        self.fail_release = Some(reason.into());
    }

    /// Make the next rollback fail with `reason`.
    pub fn fail_next_rollback(&mut self, reason: impl Into<String>) {
        self.fail_rollback = Some(reason.into());
    }
}

impl SavepointAdapter for MemoryAdapter {
    type Error = MemoryAdapterError;

    fn release_savepoint(&mut self) -> Result<(), Self::Error> {
        if let Some(reason) = self.fail_release.take() {
            return Err(MemoryAdapterError::Injected(reason));
        }
        self.open.pop();
        self.releases += 1;
        Ok(())
    }

    fn rollback_to_savepoint(&mut self) -> Result<(), Self::Error> {
        if let Some(reason) = self.fail_rollback.take() {
            return Err(MemoryAdapterError::Injected(reason));
        }
        self.open.pop();
        self.rollbacks += 1;
        Ok(())
    }

    /// The innermost open savepoint, or a fixed per-adapter key when none is
    /// open.
    fn unique_transaction_key(&self) -> TransactionKey {
        self.open.last().unwrap_or(&self.base_key).clone()
    }
}
