//! Project entity
//!
//! A parsed manifest: the project name, an optional public domain and the
//! services keyed by name.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DeployMode, InvalidModeLabel};

pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Lowercase ASCII letters and replace everything outside `[a-z0-9_]`
/// with `_`.
pub fn normalize_project_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub domain: Option<String>,
    /// Ordered by name so every traversal is deterministic
    pub services: BTreeMap<String, Service>,
}

impl Project {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_project_name(name),
            domain: None,
            services: BTreeMap::new(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// As written in the manifest, relative to the manifest's directory
    pub context: String,
    pub dockerfile: String,
}

impl BuildSpec {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            dockerfile: DEFAULT_DOCKERFILE.to_string(),
        }
    }

    pub fn with_dockerfile(mut self, dockerfile: impl Into<String>) -> Self {
        self.dockerfile = dockerfile.into();
        self
    }

    /// Directory name the context gets under the remote project directory.
    ///
    /// The last normal component of the context; contexts such as `.` or `/`
    /// that have none fall back to the service name.
    pub fn remote_dir_name(&self, service: &str) -> String {
        Path::new(&self.context)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .last()
            .unwrap_or_else(|| service.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub build: Option<BuildSpec>,
    pub image: Option<String>,
    /// `key=value` strings in document order
    pub labels: Vec<String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build: None,
            image: None,
            labels: Vec::new(),
        }
    }

    pub fn with_build(mut self, build: BuildSpec) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn mode(&self) -> Result<DeployMode, InvalidModeLabel> {
        DeployMode::from_labels(&self.labels)
    }
}

/// Local record of an initialized project, kept in `.graft/project.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub remote_path: String,
    pub initialized: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_path: remote_path.into(),
            initialized: Utc::now(),
            last_synced: None,
        }
    }

    pub fn touch_synced(&mut self) {
        self.last_synced = Some(Utc::now());
    }
}
