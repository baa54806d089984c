//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `SyncUseCase` - Validates, transfers, rewrites, uploads and rebuilds
//! - `InitUseCase` - Registers a project on the host and prepares the checkout
//! - `RemoteOperations` - Logs, compose pass-through, host cleanup

pub mod init;
pub mod operations;
pub mod sync;

pub use init::{InitOptions, InitReport, InitUseCase, RegistryError, RegistryReconciler};
pub use operations::{list_projects, set_secret, ProjectEntry, RemoteOperations};
pub use sync::{SyncOptions, SyncReport, SyncUseCase};
