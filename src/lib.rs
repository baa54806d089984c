//! Graft - compose project sync and remote rebuild
//!
//! Graft moves the source trees of a multi-service compose project to a remote
//! host, rewrites the manifest to point at the uploaded directories, injects
//! secrets, and rebuilds the services there.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{InitOptions, InitUseCase, SyncOptions, SyncReport, SyncUseCase};
pub use config::{Config, DeployConfig, ServerConfig};
pub use domain::entities::{Project, Service, SyncPlan, SyncTarget};
pub use domain::value_objects::{DeployMode, SecretStore};
pub use error::{GraftError, GraftResult};
pub use infrastructure::{FsConfigStore, SshExecutor, SshTarget, TransferBackend, TransferEngine};
