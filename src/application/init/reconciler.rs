//! Remote registry reconciliation
//!
//! The host keeps one JSON map of project name to project directory. Init
//! downloads it, checks for a collision, and stages the new entry in memory;
//! the upload happens only when the caller commits.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::domain::entities::{remote_project_dir, RemoteRegistry};
use crate::domain::ports::{RemoteError, RemoteExecutor};
use crate::domain::services::shell_quote;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("project '{name}' is already registered at {existing_path}\n  → Fix: Choose another name, or re-run with --force to take over the entry")]
    Conflict { name: String, existing_path: String },

    #[error("remote registry {path} is not valid JSON: {message}\n  → Fix: Repair or remove the file on the host")]
    Corrupted { path: String, message: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("registry staging failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize registry: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct RegistryReconciler {
    registry_path: String,
    remote_root: String,
    use_sudo: bool,
}

impl RegistryReconciler {
    pub fn new(
        registry_path: impl Into<String>,
        remote_root: impl Into<String>,
        use_sudo: bool,
    ) -> Self {
        Self {
            registry_path: registry_path.into(),
            remote_root: remote_root.into(),
            use_sudo,
        }
    }

    pub fn registry_path(&self) -> &str {
        &self.registry_path
    }

    /// Download the registry and stage `name → <remote_root>/<name>`.
    ///
    /// A missing registry is empty. An existing entry for `name` is a
    /// conflict unless `force`.
    pub fn stage<E: RemoteExecutor>(
        &self,
        executor: &E,
        name: &str,
        force: bool,
    ) -> Result<StagedRegistry, RegistryError> {
        let mut registry = self.download(executor)?;
        let project_path = remote_project_dir(&self.remote_root, name);

        let replaced = match registry.get(name) {
            Some(existing) if !force => {
                return Err(RegistryError::Conflict {
                    name: name.to_string(),
                    existing_path: existing.to_string(),
                })
            }
            Some(existing) => {
                log::warn!(
                    "replacing registry entry {} → {} (was {})",
                    name,
                    project_path,
                    existing
                );
                Some(existing.to_string())
            }
            None => None,
        };
        registry.insert(name, project_path.as_str());

        Ok(StagedRegistry {
            registry,
            name: name.to_string(),
            project_path,
            replaced,
            registry_path: self.registry_path.clone(),
            use_sudo: self.use_sudo,
        })
    }

    fn download<E: RemoteExecutor>(&self, executor: &E) -> Result<RemoteRegistry, RegistryError> {
        let scratch = tempfile::Builder::new()
            .prefix("graft-registry-")
            .suffix(".json")
            .tempfile()
            .map_err(|source| RegistryError::Io {
                path: std::env::temp_dir(),
                source,
            })?;

        match executor.download_file(&self.registry_path, scratch.path()) {
            Ok(()) => {}
            Err(RemoteError::NotFound { .. }) => {
                log::debug!("no remote registry at {}, starting empty", self.registry_path);
                return Ok(RemoteRegistry::new());
            }
            Err(e) => return Err(e.into()),
        }

        let content = fs::read_to_string(scratch.path()).map_err(|source| RegistryError::Io {
            path: scratch.path().to_path_buf(),
            source,
        })?;
        RemoteRegistry::from_json(&content).map_err(|e| RegistryError::Corrupted {
            path: self.registry_path.clone(),
            message: e.to_string(),
        })
    }
}

/// A registry with the new entry applied, not yet uploaded
#[derive(Debug, Clone)]
pub struct StagedRegistry {
    registry: RemoteRegistry,
    name: String,
    project_path: String,
    replaced: Option<String>,
    registry_path: String,
    use_sudo: bool,
}

impl StagedRegistry {
    pub fn registry(&self) -> &RemoteRegistry {
        &self.registry
    }

    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    /// Previous path of an entry taken over with `--force`
    pub fn replaced(&self) -> Option<&str> {
        self.replaced.as_deref()
    }

    /// Upload to a uniquely named temp path, then move into place.
    ///
    /// The staging name reuses the random part of the local temp file, so
    /// concurrent inits on one host never share a staging file.
    pub fn commit<E: RemoteExecutor>(self, executor: &E) -> Result<(), RegistryError> {
        let json = self.registry.to_json_pretty()?;

        let mut local = tempfile::Builder::new()
            .prefix(&format!("graft-registry.{}.", self.name))
            .suffix(".json")
            .tempfile()
            .map_err(|source| RegistryError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        local
            .write_all(json.as_bytes())
            .and_then(|_| local.flush())
            .map_err(|source| RegistryError::Io {
                path: local.path().to_path_buf(),
                source,
            })?;

        let staging = format!(
            "/tmp/{}",
            local.path().file_name().unwrap_or_default().to_string_lossy()
        );
        executor.upload_file(local.path(), &staging)?;
        executor.execute(&self.install_command(&staging))?;

        log::info!("registered {} → {}", self.name, self.project_path);
        Ok(())
    }

    fn install_command(&self, staging: &str) -> String {
        let sudo = if self.use_sudo { "sudo " } else { "" };
        let target = shell_quote(&self.registry_path);
        let install = format!("{sudo}mv {} {}", shell_quote(staging), target);
        match self.registry_path.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => {
                format!("{sudo}mkdir -p {} && {}", shell_quote(parent), install)
            }
            _ => install,
        }
    }
}
