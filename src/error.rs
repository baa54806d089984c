//! Error types for Graft
//!
//! Every layer owns a `thiserror` enum; `GraftError` wraps them so an
//! invocation ends with exactly one terminal error.

use thiserror::Error;

use crate::application::init::RegistryError;
use crate::config::ConfigError;
use crate::domain::ports::{RemoteError, StoreError};
use crate::domain::services::ValidationError;
use crate::domain::value_objects::SecretError;
use crate::infrastructure::transfer::TransferError;

/// Result type alias for Graft operations
pub type GraftResult<T> = Result<T, GraftError>;

/// Main error type for Graft operations
#[derive(Error, Debug)]
pub enum GraftError {
    /// Manifest, service, context or dockerfile failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every transfer strategy failed for a service
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// A remote command or file transfer failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Remote registry could not be reconciled
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Secret references in the manifest could not be resolved
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// Local state (metadata, secrets, local registry) could not be accessed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No `.graft/project.json` in the project directory
    #[error("project is not initialized (no .graft/project.json)\n  → Fix: Run `graft init` in the project directory")]
    NotInitialized,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
