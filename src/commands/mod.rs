//! Command handlers
//!
//! Each handler loads configuration for the project directory, builds the
//! adapters it needs and hands off to an application use case.

pub mod init;
pub mod projects;
pub mod remote;
pub mod secret;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use graft::config::{Config, LoadedConfig};
use graft::infrastructure::{FsConfigStore, SshExecutor};

pub fn project_root(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    dir.canonicalize()
        .with_context(|| format!("project directory {} not found", dir.display()))
}

/// Effective config for `project_root`, with unknown-key warnings logged.
pub fn load_config(project_root: &Path) -> Result<Config> {
    let LoadedConfig {
        config,
        source,
        warnings,
    } = Config::load_or_default(Some(project_root))?;

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    match source {
        Some(path) => log::debug!("using config {}", path.display()),
        None => log::debug!("no config file found, using defaults"),
    }
    Ok(config)
}

pub fn connect(config: &Config) -> Result<SshExecutor> {
    let target = config.ssh_target()?;
    log::info!("connecting to {}", target.destination());
    Ok(SshExecutor::connect(target)?)
}

pub fn store(project_root: &Path) -> FsConfigStore {
    FsConfigStore::new(project_root)
}
