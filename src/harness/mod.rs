//! In-memory collaborators for exercising the emulator without a database.
//!
//! [`MemoryAdapter`] stands in for a connection adapter, [`RecordingCallbacks`]
//! for the record layer and [`RecordingCleanup`] for the per-context callback
//! registry. The recorders are `Clone` handles: keep one, hand the other to
//! the emulator, and inspect what happened afterwards.

mod adapter;
mod recorder;

pub use adapter::{MemoryAdapter, MemoryAdapterError};
pub use recorder::{
    CallbackError, FnCallbacks, NotificationEvent, RecordingCallbacks, RecordingCleanup,
};
