//! Transaction keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a transaction key is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transaction key '{key}': {reason}")]
pub struct InvalidKeyError {
    pub key: String,
    pub reason: &'static str,
}

/// Identifies one nested transaction instance within a nesting context.
///
/// Keys must stay stable for the duration of one release or rollback and
/// must differ between nesting levels that are open at the same time. A key
/// may be reused once the savepoint it named is gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionKey(String);

impl TransactionKey {
    /// Create a key from an adapter-supplied identifier.
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidKeyError {
                key,
                reason: "key cannot be empty",
            });
        }
        if key.chars().any(char::is_whitespace) {
            return Err(InvalidKeyError {
                key,
                reason: "key cannot contain whitespace",
            });
        }
        Ok(Self(key))
    }

    /// Generate a fresh, unique key.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TransactionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionKey {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TransactionKey> for String {
    fn from(key: TransactionKey) -> Self {
        key.0
    }
}
