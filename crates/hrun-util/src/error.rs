//! Error types for hrun

use thiserror::Error;

use crate::{EXIT_CONFIG, EXIT_INTERNAL, EXIT_INVENTORY, EXIT_NOT_FOUND, EXIT_SPAWN};

/// Core error type for hrun operations
///
/// None of these are retried: an absent variable or a version that does not
/// exist cannot be fixed by trying again. A child or supervisor that ends by
/// signal is not an error; it is reported through the exit status.
#[derive(Debug, Error)]
pub enum HrunError {
    /// A required environment variable or setting is absent
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// No version matches the specifier, or no versions are installed
    #[error("Version not found: {0}")]
    ResolutionError(String),

    /// The child process could not be created
    #[error("Spawn failed: {0}")]
    SpawnError(String),

    /// The build inventory could not complete an operation
    #[error("Inventory error: {0}")]
    InventoryError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HrunError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::ResolutionError(msg.into())
    }

    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::SpawnError(msg.into())
    }

    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::InventoryError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Process exit status the supervisor uses when it stops on this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HrunError::ConfigurationError(_) => EXIT_CONFIG,
            HrunError::ResolutionError(_) => EXIT_NOT_FOUND,
            HrunError::SpawnError(_) => EXIT_SPAWN,
            HrunError::InventoryError(_) => EXIT_INVENTORY,
            HrunError::Internal(_) => EXIT_INTERNAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, HrunError>;
