//! Configuration module for Graft
//!
//! Configuration hierarchy:
//! 1. Environment variables (GRAFT_*)
//! 2. Project config (.graft/config.toml)
//! 3. User config (~/.graft/config.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load_layered, with_env_overrides, ConfigError, ConfigWarning, LoadedConfig, ENV_PREFIX,
    PROJECT_CONFIG,
};
pub use types::{
    Config, DeployConfig, ServerConfig, DEFAULT_MANIFEST, DEFAULT_REGISTRY_PATH,
    DEFAULT_REMOTE_ROOT,
};
