//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::infrastructure::remote::{SshTarget, DEFAULT_SSH_PORT, DEFAULT_SSH_USER};

use super::loader::{self, ConfigError, ConfigWarning, LoadedConfig};

pub const DEFAULT_REMOTE_ROOT: &str = "/opt/graft/projects";
pub const DEFAULT_REGISTRY_PATH: &str = "/opt/graft/registry.json";
pub const DEFAULT_MANIFEST: &str = "graft-compose.yml";

/// Deploy host connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub key_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            user: default_user(),
            key_path: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_user() -> String {
    DEFAULT_SSH_USER.to_string()
}

/// Remote layout and compose invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_remote_root")]
    pub remote_root: String,

    #[serde(default = "default_registry_path")]
    pub registry_path: String,

    /// Prefix remote docker and mkdir commands with `sudo`
    #[serde(default = "default_true")]
    pub use_sudo: bool,

    /// Manifest file name, relative to the project root
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            remote_root: default_remote_root(),
            registry_path: default_registry_path(),
            use_sudo: true,
            manifest: default_manifest(),
        }
    }
}

fn default_remote_root() -> String {
    DEFAULT_REMOTE_ROOT.to_string()
}

fn default_registry_path() -> String {
    DEFAULT_REGISTRY_PATH.to_string()
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST.to_string()
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load_with_warnings(path)?.0)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Project config, else user config, else defaults; then `GRAFT_*`
    /// environment overrides.
    pub fn load_or_default(project_root: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        loader::load_or_default(project_root)
    }

    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.deploy.manifest)
    }

    /// Connection details; fails when no host is configured.
    pub fn ssh_target(&self) -> Result<SshTarget, ConfigError> {
        let host = self
            .server
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHost)?;

        let mut target = SshTarget::new(host)
            .with_port(self.server.port)
            .with_user(self.server.user.clone());
        if let Some(key) = &self.server.key_path {
            target = target.with_key_path(expand_home(key));
        }
        Ok(target)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
