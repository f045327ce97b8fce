//! Savepoint callbacks - transaction lifecycle notifications inside one
//! enclosing transaction.
//!
//! Test suites often wrap every test in a single database transaction and
//! roll it back afterwards. Code under test then never sees a real commit,
//! so "after commit" style callbacks never run. This crate decorates the
//! connection adapter so that each savepoint release or rollback fires the
//! notifications a real commit or rollback would.
//!
//! # Example
//!
//! ```
//! use savepoint_callbacks::emulator::{Notification, RollbackOutcome, SavepointEmulator};
//! use savepoint_callbacks::harness::{MemoryAdapter, RecordingCallbacks, RecordingCleanup};
//!
//! let callbacks = RecordingCallbacks::new();
//! let cleanup = RecordingCleanup::new();
//! let mut conn = SavepointEmulator::new(MemoryAdapter::new(), callbacks.clone(), cleanup);
//!
//! let key = conn.adapter_mut().open_savepoint();
//! conn.release(&key).unwrap();
//! assert_eq!(callbacks.count(Notification::AfterCommit), 1);
//!
//! let key = conn.adapter_mut().open_savepoint();
//! assert_eq!(conn.rollback_to(&key).unwrap(), RollbackOutcome::RolledBack);
//! assert_eq!(callbacks.count(Notification::BeforeRollback), 1);
//! assert!(conn.tracker().is_empty());
//! ```

pub mod emulator;
pub mod harness;
pub mod tracker;
