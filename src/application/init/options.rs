//! Init Options

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_MANIFEST;

/// Options for the init use case
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Local project directory
    pub project_root: PathBuf,
    /// Project name; defaults to the directory name
    pub name: Option<String>,
    /// Public domain written into the starter manifest
    pub domain: Option<String>,
    /// Take over an existing remote registry entry
    pub force: bool,
    /// Manifest file name, relative to `project_root`
    pub manifest: String,
}

impl InitOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            name: None,
            domain: None,
            force: false,
            manifest: DEFAULT_MANIFEST.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(&self.manifest)
    }

    /// Explicit name, else the last component of the project directory.
    pub fn raw_name(&self) -> Option<String> {
        self.name.clone().or_else(|| dir_name(&self.project_root))
    }
}

fn dir_name(path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    absolute
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .last()
}
