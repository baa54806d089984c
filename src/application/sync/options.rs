//! Sync Options

use std::path::PathBuf;

use crate::domain::entities::SyncTarget;

/// Options for the sync use case
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Manifest to resolve (usually `<project>/graft-compose.yml`)
    pub manifest_path: PathBuf,
    /// Whole project, one service, or the manifest only
    pub target: SyncTarget,
    /// Purge the builder cache and rebuild without layer reuse
    pub no_cache: bool,
    /// Stop after the manifest upload; no build, no restart
    pub upload_only: bool,
}

impl SyncOptions {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            target: SyncTarget::Project,
            no_cache: false,
            upload_only: false,
        }
    }

    pub fn with_target(mut self, target: SyncTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_service(self, service: impl Into<String>) -> Self {
        self.with_target(SyncTarget::Service(service.into()))
    }

    pub fn manifest_only(self) -> Self {
        self.with_target(SyncTarget::ManifestOnly)
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn with_upload_only(mut self, upload_only: bool) -> Self {
        self.upload_only = upload_only;
        self
    }
}
