//! Emulator configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// What to do when a rollback arrives for a key already recorded as
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommittedRollback {
    /// Skip both the notifications and the physical rollback.
    #[default]
    Skip,
    /// Skip the notifications but still issue the physical rollback.
    Physical,
}

impl fmt::Display for CommittedRollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommittedRollback::Skip => write!(f, "skip"),
            CommittedRollback::Physical => write!(f, "physical"),
        }
    }
}

impl std::str::FromStr for CommittedRollback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(CommittedRollback::Skip),
            "physical" => Ok(CommittedRollback::Physical),
            _ => Err(format!("unknown committed rollback policy: {}", s)),
        }
    }
}

/// Emulator configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Policy for rolling back an already committed key.
    pub committed_rollback: CommittedRollback,
    /// Session label attached to log output.
    pub label: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            committed_rollback: CommittedRollback::Skip,
            label: "savepoint".to_string(),
        }
    }
}

impl EmulatorConfig {
    /// Create a configuration with the given session label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the committed rollback policy.
    pub fn committed_rollback(mut self, policy: CommittedRollback) -> Self {
        self.committed_rollback = policy;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EmulatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("label cannot be empty".into()));
        }
        Ok(())
    }
}
