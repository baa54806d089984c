//! Smaller commands around an initialized project
//!
//! Log streaming, compose pass-through and host cleanup run against the
//! remote project directory recorded at init. Secrets and the project
//! listing are purely local.

use std::path::PathBuf;

use crate::domain::ports::{ConfigStore, RemoteExecutor, StoreError};
use crate::domain::services::ComposeCommands;
use crate::error::{GraftError, GraftResult};

/// One entry of the local project listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
    /// Whether the directory still exists
    pub present: bool,
}

pub fn list_projects<S: ConfigStore>(store: &S) -> Result<Vec<ProjectEntry>, StoreError> {
    let registry = store.load_local_registry()?;
    Ok(registry
        .all()
        .map(|(name, path)| ProjectEntry {
            name: name.to_string(),
            path: path.to_path_buf(),
            present: path.is_dir(),
        })
        .collect())
}

pub fn set_secret<S: ConfigStore>(store: &S, key: &str, value: &str) -> Result<(), StoreError> {
    store.append_secret(key, value)?;
    log::info!("stored secret {}", key);
    Ok(())
}

/// Commands run in the remote directory of the current project
pub struct RemoteOperations<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    executor: E,
    store: S,
    use_sudo: bool,
}

impl<E, S> RemoteOperations<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    pub fn new(executor: E, store: S, use_sudo: bool) -> Self {
        Self {
            executor,
            store,
            use_sudo,
        }
    }

    fn commands(&self) -> GraftResult<ComposeCommands> {
        let metadata = self
            .store
            .load_metadata()?
            .ok_or(GraftError::NotInitialized)?;
        Ok(ComposeCommands::new(metadata.remote_path, self.use_sudo))
    }

    /// Follow the last 100 log lines of one service until interrupted.
    pub fn logs(&self, service: &str) -> GraftResult<()> {
        let commands = self.commands()?;
        self.executor.execute(&commands.logs(service))?;
        Ok(())
    }

    /// `docker compose <args>` in the remote project directory.
    pub fn compose(&self, args: &[String]) -> GraftResult<()> {
        let commands = self.commands()?;
        self.executor.execute(&commands.passthrough(args))?;
        Ok(())
    }

    /// Run every host-wide prune step. Failures are returned as warnings.
    pub fn host_clean(&self) -> Vec<String> {
        let commands = ComposeCommands::new(String::new(), self.use_sudo);
        let mut warnings = Vec::new();
        for (label, command) in commands.host_clean() {
            log::info!("cleaning {}", label);
            if let Err(e) = self.executor.execute(&command) {
                log::warn!("{} cleanup failed: {}", label, e);
                warnings.push(format!("{}: {}", label, e));
            }
        }
        warnings
    }
}
