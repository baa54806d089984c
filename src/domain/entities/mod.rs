//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `Project` / `Service` - A parsed manifest
//! - `SyncPlan` - What one sync invocation moves and rewrites
//! - `RemoteRegistry` / `LocalRegistry` - Project name to path mappings

mod project;
mod registry;
mod sync_plan;

pub use project::{
    normalize_project_name, BuildSpec, Project, ProjectMetadata, Service, DEFAULT_DOCKERFILE,
};
pub use registry::{LocalRegistry, RemoteRegistry};
pub use sync_plan::{remote_project_dir, ContextRewrite, ServiceTransfer, SyncPlan, SyncTarget};
