//! Sync plan entity
//!
//! The validated result of resolving a manifest for one sync invocation.

use std::path::PathBuf;

use super::Project;

/// What a sync invocation covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// Every serverbuild service, then rebuild everything
    Project,
    /// One service only
    Service(String),
    /// Upload the manifest, transfer nothing
    ManifestOnly,
}

impl SyncTarget {
    pub fn service_name(&self) -> Option<&str> {
        match self {
            SyncTarget::Service(name) => Some(name),
            _ => None,
        }
    }
}

/// A serverbuild service whose source moves in this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTransfer {
    pub service: String,
    /// Absolute, validated build context
    pub local_context: PathBuf,
    /// Directory name under the remote project directory
    pub remote_name: String,
    pub dockerfile: String,
}

/// A `build.context` value to point at its uploaded location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRewrite {
    pub service: String,
    /// As written in the manifest
    pub original_context: String,
    pub remote_name: String,
}

impl ContextRewrite {
    pub fn new_context(&self) -> String {
        format!("./{}", self.remote_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub project: Project,
    pub remote_dir: String,
    pub target: SyncTarget,
    pub transfers: Vec<ServiceTransfer>,
    /// Covers every serverbuild service, not only the transferred ones
    pub rewrites: Vec<ContextRewrite>,
    pub manifest_path: PathBuf,
}

impl SyncPlan {
    pub fn remote_manifest_path(&self) -> String {
        format!("{}/docker-compose.yml", self.remote_dir)
    }

    pub fn service_remote_dir(&self, transfer: &ServiceTransfer) -> String {
        format!("{}/{}", self.remote_dir, transfer.remote_name)
    }
}

/// `<remote_root>/<project>`, without a doubled separator.
pub fn remote_project_dir(remote_root: &str, project: &str) -> String {
    let root = remote_root.trim_end_matches('/');
    format!("{}/{}", root, project)
}
