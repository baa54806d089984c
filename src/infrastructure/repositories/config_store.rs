//! Filesystem ConfigStore
//!
//! Project state lives under `<project>/.graft/`; the per-user registry is
//! `~/.graft/projects.json`, written under an exclusive `fs2` lock.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::entities::{LocalRegistry, ProjectMetadata};
use crate::domain::ports::{ConfigStore, StoreError};
use crate::domain::value_objects::SecretStore;

pub const STATE_DIR: &str = ".graft";
const METADATA_FILE: &str = "project.json";
const SECRETS_FILE: &str = "secrets.env";

pub struct FsConfigStore {
    project_root: PathBuf,
    registry_path: PathBuf,
}

impl FsConfigStore {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            registry_path: default_registry_path(),
        }
    }

    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.state_dir().join(METADATA_FILE)
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.state_dir().join(SECRETS_FILE)
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    fn lock_path(&self) -> PathBuf {
        self.registry_path.with_extension("lock")
    }

    fn read_registry(&self) -> Result<LocalRegistry, StoreError> {
        if !self.registry_path.exists() {
            return Ok(LocalRegistry::new());
        }
        let content = fs::read_to_string(&self.registry_path)
            .map_err(|e| access(&self.registry_path, e))?;
        if content.trim().is_empty() {
            return Ok(LocalRegistry::new());
        }
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
            path: self.registry_path.clone(),
            message: e.to_string(),
        })
    }

    fn write_registry(&self, registry: &LocalRegistry) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(registry).map_err(|e| StoreError::Serialization {
                path: self.registry_path.clone(),
                message: e.to_string(),
            })?;
        write_file(&self.registry_path, &content)
    }
}

impl ConfigStore for FsConfigStore {
    fn load_metadata(&self) -> Result<Option<ProjectMetadata>, StoreError> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| access(&path, e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupted {
                path,
                message: e.to_string(),
            })
    }

    fn save_metadata(&self, metadata: &ProjectMetadata) -> Result<(), StoreError> {
        let path = self.metadata_path();
        let content =
            serde_json::to_string_pretty(metadata).map_err(|e| StoreError::Serialization {
                path: path.clone(),
                message: e.to_string(),
            })?;
        write_file(&path, &content)
    }

    fn load_local_registry(&self) -> Result<LocalRegistry, StoreError> {
        self.read_registry()
    }

    fn update_local_registry(&self, name: &str, path: &Path) -> Result<(), StoreError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| access(parent, e))?;
        }

        let lock_file = fs::File::create(&lock_path).map_err(|e| access(&lock_path, e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| access(&lock_path, e))?;

        let result = self.read_registry().and_then(|mut registry| {
            registry.upsert(name, path);
            self.write_registry(&registry)
        });

        let _ = lock_file.unlock();
        result
    }

    fn load_secrets(&self) -> Result<SecretStore, StoreError> {
        let path = self.secrets_path();
        if !path.exists() {
            return Ok(SecretStore::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| access(&path, e))?;
        Ok(SecretStore::parse(&content))
    }

    fn append_secret(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let line = SecretStore::format_entry(key, value)
            .map_err(|e| StoreError::InvalidSecret(e.to_string()))?;

        let path = self.secrets_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| access(parent, e))?;
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&path).map_err(|e| access(&path, e))?;

        // A hand-edited file may lack a final newline.
        let needs_newline = fs::read(&path)
            .map(|bytes| !bytes.is_empty() && !bytes.ends_with(b"\n"))
            .unwrap_or(false);
        if needs_newline {
            file.write_all(b"\n").map_err(|e| access(&path, e))?;
        }
        file.write_all(line.as_bytes())
            .map_err(|e| access(&path, e))
    }
}

fn access(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Access {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| access(parent, e))?;
    }
    fs::write(path, content).map_err(|e| access(path, e))
}

fn default_registry_path() -> PathBuf {
    // dirs::home_dir cannot be redirected on every platform, so tests point here.
    if let Ok(path) = std::env::var("GRAFT_LOCAL_REGISTRY") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .map(|h| h.join(STATE_DIR).join("projects.json"))
        .unwrap_or_else(|| PathBuf::from("~/.graft/projects.json"))
}
