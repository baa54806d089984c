//! ConfigStore port
//!
//! Local project state: `.graft/project.json`, `.graft/secrets.env` and the
//! per-user registry at `~/.graft/projects.json`.

use std::path::{Path, PathBuf};

use crate::domain::entities::{LocalRegistry, ProjectMetadata};
use crate::domain::value_objects::SecretStore;

pub trait ConfigStore {
    /// `None` when the project has not been initialized here.
    fn load_metadata(&self) -> Result<Option<ProjectMetadata>, StoreError>;
    fn save_metadata(&self, metadata: &ProjectMetadata) -> Result<(), StoreError>;

    fn load_local_registry(&self) -> Result<LocalRegistry, StoreError>;
    /// Upsert one entry under the registry's file lock.
    fn update_local_registry(&self, name: &str, path: &Path) -> Result<(), StoreError>;

    /// A missing secret file is an empty store.
    fn load_secrets(&self) -> Result<SecretStore, StoreError>;
    fn append_secret(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn load_metadata(&self) -> Result<Option<ProjectMetadata>, StoreError> {
        (**self).load_metadata()
    }

    fn save_metadata(&self, metadata: &ProjectMetadata) -> Result<(), StoreError> {
        (**self).save_metadata(metadata)
    }

    fn load_local_registry(&self) -> Result<LocalRegistry, StoreError> {
        (**self).load_local_registry()
    }

    fn update_local_registry(&self, name: &str, path: &Path) -> Result<(), StoreError> {
        (**self).update_local_registry(name, path)
    }

    fn load_secrets(&self) -> Result<SecretStore, StoreError> {
        (**self).load_secrets()
    }

    fn append_secret(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).append_secret(key, value)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("failed to access {}: {message}", .path.display())]
    Access { path: PathBuf, message: String },

    #[error("failed to serialize {}: {message}", .path.display())]
    Serialization { path: PathBuf, message: String },

    #[error(
        "file corrupted: {}\n  → Fix: Delete it and run the command again\n  → Run: rm {}\n  → Details: {message}",
        .path.display(),
        .path.display()
    )]
    Corrupted { path: PathBuf, message: String },

    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}
