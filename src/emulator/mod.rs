//! Savepoint lifecycle emulation.
//!
//! Inside a test harness that wraps everything in one outer transaction,
//! nested units of work are savepoints. [`SavepointEmulator`] decorates the
//! connection adapter so that releasing a savepoint fires the commit
//! notifications and rolling back fires the rollback notifications, as if
//! each savepoint were a real transaction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SavepointEmulator                         │
//! │      (release / rollback_to, notification ordering)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │  Savepoint  │       │  Lifecycle  │       │   Commit    │
//!  │   Adapter   │       │  Callbacks  │       │   Tracker   │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use savepoint_callbacks::emulator::{EmulationRegistry, NoCleanup, Notification};
//! use savepoint_callbacks::harness::{MemoryAdapter, RecordingCallbacks};
//!
//! let registry = EmulationRegistry::new();
//! let callbacks = RecordingCallbacks::new();
//! let mut conn = registry.equip(MemoryAdapter::new(), callbacks.clone(), NoCleanup);
//!
//! let key = conn.adapter_mut().open_savepoint();
//! conn.release(&key).unwrap();
//!
//! assert_eq!(callbacks.count(Notification::AfterCommit), 1);
//! assert_eq!(conn.depth(), 0);
//! ```

mod adapter;
mod config;
mod emulator;
mod error;
mod notification;
mod registry;

pub use adapter::{CleanupHook, NoCleanup, SavepointAdapter};
pub use config::{CommittedRollback, ConfigError, EmulatorConfig};
pub use emulator::{RollbackOutcome, SavepointEmulator};
pub use error::{BoxError, EmulatorError, EmulatorResult};
pub use notification::{LifecycleCallbacks, NoCallbacks, Notification};
pub use registry::EmulationRegistry;
