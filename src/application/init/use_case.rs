//! Init Use Case
//!
//! 1. Normalize the project name
//! 2. Stage the remote registry entry (conflict check)
//! 3. Create the remote project directory
//! 4. Write local metadata
//! 5. Write the starter manifest if absent, create `env/`
//! 6. Ensure `.gitignore` entries
//! 7. Upsert the local registry
//! 8. Commit the remote registry
//!
//! The remote registry is uploaded last, so a failure in any earlier step
//! leaves it untouched.

use std::fs;
use std::path::PathBuf;

use crate::domain::entities::{normalize_project_name, ProjectMetadata};
use crate::domain::ports::{ConfigStore, RemoteExecutor};
use crate::domain::services::{ComposeCommands, ValidationError};
use crate::error::GraftResult;

use super::boilerplate::{ensure_gitignore, write_manifest_if_absent};
use super::options::InitOptions;
use super::reconciler::RegistryReconciler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub name: String,
    pub remote_path: String,
    pub manifest: PathBuf,
    pub manifest_created: bool,
    /// Previous remote path when an entry was taken over
    pub replaced: Option<String>,
}

pub struct InitUseCase<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    executor: E,
    store: S,
    reconciler: RegistryReconciler,
    use_sudo: bool,
}

impl<E, S> InitUseCase<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    pub fn new(executor: E, store: S, reconciler: RegistryReconciler, use_sudo: bool) -> Self {
        Self {
            executor,
            store,
            reconciler,
            use_sudo,
        }
    }

    pub fn execute(&self, options: &InitOptions) -> GraftResult<InitReport> {
        let name = options
            .raw_name()
            .map(|raw| normalize_project_name(&raw))
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingProjectName)?;

        let staged = self
            .reconciler
            .stage(&self.executor, &name, options.force)?;
        let remote_path = staged.project_path().to_string();
        let replaced = staged.replaced().map(str::to_string);

        let commands = ComposeCommands::new(remote_path.as_str(), self.use_sudo);
        self.executor.execute(&commands.ensure_project_dir())?;

        self.store
            .save_metadata(&ProjectMetadata::new(name.as_str(), remote_path.as_str()))?;

        let manifest = options.manifest_path();
        let domain = options
            .domain
            .clone()
            .unwrap_or_else(|| format!("{}.example.com", name));
        let manifest_created = write_manifest_if_absent(&manifest, &name, &domain)?;
        if manifest_created {
            log::info!("wrote {}", manifest.display());
        }
        fs::create_dir_all(options.project_root.join("env"))?;

        let added = ensure_gitignore(&options.project_root)?;
        if !added.is_empty() {
            log::debug!(".gitignore: added {}", added.join(", "));
        }

        let local_root = fs::canonicalize(&options.project_root)?;
        self.store.update_local_registry(&name, &local_root)?;

        staged.commit(&self.executor)?;

        Ok(InitReport {
            name,
            remote_path,
            manifest,
            manifest_created,
            replaced,
        })
    }
}
