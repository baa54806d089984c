//! Manifest resolution
//!
//! Turns a manifest and a sync target into a validated [`SyncPlan`]. Every
//! check that can fail happens here, before anything touches the remote host.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::domain::entities::{
    normalize_project_name, remote_project_dir, ContextRewrite, Project, Service, ServiceTransfer,
    SyncPlan, SyncTarget,
};
use crate::domain::value_objects::DeployMode;

use super::manifest::parse_manifest;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("manifest not found: {}\n  → Fix: Run `graft init` in the project directory, or check the manifest name in .graft/config.toml", .path.display())]
    MissingManifest { path: PathBuf },

    #[error("invalid manifest {}: {message}\n  → Fix: Check the YAML syntax; service names must be unique", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("project name is unknown\n  → Fix: Add a top-level `name:` to the manifest or run `graft init`")]
    MissingProjectName,

    #[error("service '{service}' not found in manifest\n  → Fix: Use one of: {}", .available.join(", "))]
    ServiceNotFound {
        service: String,
        available: Vec<String>,
    },

    #[error("service '{service}' has an unknown deployment mode in label '{label}'\n  → Fix: Use graft.mode=serverbuild or graft.mode=localbuild")]
    InvalidMode { service: String, label: String },

    #[error("service '{service}' is serverbuild but has no build section\n  → Fix: Add `build: {{ context: ./<dir> }}` or switch the service to graft.mode=localbuild")]
    MissingBuild { service: String },

    #[error("build context directory not found: {}\n  → Fix: Create the directory or update 'context' for service '{service}' in the manifest", .path.display())]
    MissingContext { service: String, path: PathBuf },

    #[error("Dockerfile not found: {dockerfile}\n  → Checked path: {}\n  → Fix: Check the 'dockerfile' field of service '{service}'; the file name must match exactly, including case", .path.display())]
    MissingDockerfile {
        service: String,
        dockerfile: String,
        path: PathBuf,
    },

    #[error("services '{first}' and '{second}' would both upload to ./{remote_name}\n  → Fix: Rename one of the build context directories so their names differ")]
    RemoteNameCollision {
        first: String,
        second: String,
        remote_name: String,
    },
}

/// Resolves manifests against one remote root.
#[derive(Debug, Clone)]
pub struct Resolver {
    remote_root: String,
    fallback_name: Option<String>,
}

impl Resolver {
    pub fn new(remote_root: impl Into<String>) -> Self {
        Self {
            remote_root: remote_root.into(),
            fallback_name: None,
        }
    }

    /// Name to use when the manifest has no top-level `name`, usually the
    /// one recorded in local metadata at init.
    pub fn with_fallback_name(mut self, name: Option<String>) -> Self {
        self.fallback_name = name;
        self
    }

    pub fn resolve(
        &self,
        manifest_path: &Path,
        target: &SyncTarget,
    ) -> Result<SyncPlan, ValidationError> {
        let content = fs::read_to_string(manifest_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ValidationError::MissingManifest {
                path: manifest_path.to_path_buf(),
            },
            _ => ValidationError::InvalidManifest {
                path: manifest_path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let parsed = parse_manifest(&content).map_err(|e| ValidationError::InvalidManifest {
            path: manifest_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let raw_name = parsed
            .name
            .or_else(|| self.fallback_name.clone())
            .ok_or(ValidationError::MissingProjectName)?;
        let name = normalize_project_name(&raw_name);
        if name.is_empty() {
            return Err(ValidationError::MissingProjectName);
        }

        let project = Project {
            name,
            domain: parsed.domain,
            services: parsed.services,
        };

        if let SyncTarget::Service(service) = target {
            if project.service(service).is_none() {
                return Err(ValidationError::ServiceNotFound {
                    service: service.clone(),
                    available: project.service_names(),
                });
            }
        }

        let manifest_dir = match manifest_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut transfers = Vec::new();
        let mut rewrites = Vec::new();
        let mut claimed: BTreeMap<String, (String, PathBuf)> = BTreeMap::new();

        for service in project.services.values() {
            let mode = service_mode(service)?;
            if mode != DeployMode::ServerBuild {
                continue;
            }

            if let Some(build) = &service.build {
                let remote_name = build.remote_dir_name(&service.name);
                let context = comparable_context(&manifest_dir, &build.context);
                match claimed.get(&remote_name) {
                    Some((first, first_context)) if *first_context != context => {
                        return Err(ValidationError::RemoteNameCollision {
                            first: first.clone(),
                            second: service.name.clone(),
                            remote_name,
                        });
                    }
                    Some(_) => {}
                    None => {
                        claimed.insert(remote_name.clone(), (service.name.clone(), context));
                    }
                }
                rewrites.push(ContextRewrite {
                    service: service.name.clone(),
                    original_context: build.context.clone(),
                    remote_name,
                });
            }

            let selected = match target {
                SyncTarget::Project => true,
                SyncTarget::Service(name) => name == &service.name,
                SyncTarget::ManifestOnly => false,
            };
            if selected {
                transfers.push(validate_transfer(service, &manifest_dir)?);
            }
        }

        log::debug!(
            "resolved {}: {} transfer(s), {} rewrite(s)",
            project.name,
            transfers.len(),
            rewrites.len()
        );

        Ok(SyncPlan {
            remote_dir: remote_project_dir(&self.remote_root, &project.name),
            project,
            target: target.clone(),
            transfers,
            rewrites,
            manifest_path: manifest_path.to_path_buf(),
        })
    }
}

fn service_mode(service: &Service) -> Result<DeployMode, ValidationError> {
    service.mode().map_err(|e| ValidationError::InvalidMode {
        service: service.name.clone(),
        label: e.label,
    })
}

fn validate_transfer(
    service: &Service,
    manifest_dir: &Path,
) -> Result<ServiceTransfer, ValidationError> {
    let build = service
        .build
        .as_ref()
        .ok_or_else(|| ValidationError::MissingBuild {
            service: service.name.clone(),
        })?;

    let context = resolve_context(manifest_dir, &build.context);
    if !context.is_dir() {
        return Err(ValidationError::MissingContext {
            service: service.name.clone(),
            path: context,
        });
    }

    let dockerfile_path = context.join(&build.dockerfile);
    if !exists_with_exact_case(&context, Path::new(&build.dockerfile)) {
        return Err(ValidationError::MissingDockerfile {
            service: service.name.clone(),
            dockerfile: build.dockerfile.clone(),
            path: dockerfile_path,
        });
    }

    Ok(ServiceTransfer {
        service: service.name.clone(),
        local_context: context,
        remote_name: build.remote_dir_name(&service.name),
        dockerfile: build.dockerfile.clone(),
    })
}

/// Join a manifest-relative context onto the manifest directory, dropping
/// `.` components.
fn resolve_context(manifest_dir: &Path, context: &str) -> PathBuf {
    let context = Path::new(context);
    let base = if context.is_absolute() {
        PathBuf::new()
    } else {
        manifest_dir.to_path_buf()
    };
    let mut resolved = base;
    for component in context.components() {
        match component {
            Component::CurDir => {}
            other => resolved.push(other.as_os_str()),
        }
    }
    if resolved.as_os_str().is_empty() {
        resolved.push(".");
    }
    resolved
}

/// Context path used to decide whether two services share a source tree.
fn comparable_context(manifest_dir: &Path, context: &str) -> PathBuf {
    let resolved = resolve_context(manifest_dir, context);
    fs::canonicalize(&resolved).unwrap_or(resolved)
}

/// Case-insensitive filesystems would accept `dockerfile` for `Dockerfile`;
/// the remote build would not. Each component must appear verbatim in its
/// parent's listing.
fn exists_with_exact_case(base: &Path, relative: &Path) -> bool {
    let mut current = if relative.is_absolute() {
        PathBuf::new()
    } else {
        base.to_path_buf()
    };

    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let Ok(entries) = fs::read_dir(&current) else {
                    return false;
                };
                let found = entries
                    .filter_map(Result::ok)
                    .any(|entry| entry.file_name() == name);
                if !found {
                    return false;
                }
                current.push(name);
            }
            Component::CurDir => {}
            other => current.push(other.as_os_str()),
        }
    }

    current.is_file()
}
