//! Value Objects
//!
//! Immutable types with no identity, defined by their values.

mod deploy_mode;
mod ignore_patterns;
mod secrets;

pub use deploy_mode::{DeployMode, InvalidModeLabel, MODE_LABEL_KEYS};
pub use ignore_patterns::{IgnoreError, IgnorePatterns, BUILTIN_EXCLUDES, IGNORE_FILE_NAME};
pub use secrets::{SecretError, SecretStore};
