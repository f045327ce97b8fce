//! Commit-state tracking for emulated nested transactions.
//!
//! Every session owns one [`CommitTracker`]. It records, per
//! [`TransactionKey`], whether the nested transaction behind that key has
//! finished its commit phase, and counts how many savepoint operations are
//! currently open.
//!
//! # Usage
//!
//! ```
//! use savepoint_callbacks::tracker::{CommitTracker, TransactionKey};
//!
//! let tracker = CommitTracker::new();
//! let key = TransactionKey::generate();
//!
//! assert!(!tracker.is_committed(&key));
//! tracker.mark_committed(&key, true);
//! assert!(tracker.is_committed(&key));
//!
//! tracker.clear(&key);
//! tracker.clear(&key); // already gone, no-op
//! assert!(tracker.is_empty());
//! ```

mod context;
mod key;

pub use context::{CommitTracker, NestingContext};
pub use key::{InvalidKeyError, TransactionKey};
