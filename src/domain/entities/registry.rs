//! Registry entities
//!
//! `RemoteRegistry` maps project names to their directory on a host and is
//! shared by everyone deploying there. `LocalRegistry` maps project names to
//! checkouts on this machine for `graft projects`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRegistry {
    entries: BTreeMap<String, String>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty or whitespace-only document is an empty registry.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(content)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the path previously registered under `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), path.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalRegistry {
    projects: BTreeMap<String, PathBuf>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-initializing a project elsewhere simply moves its entry.
    pub fn upsert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.projects.insert(name.into(), path.into());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.projects.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.projects.get(name).map(PathBuf::as_path)
    }

    pub fn all(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.projects
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Drop entries whose directory no longer exists; returns their names.
    pub fn prune(&mut self) -> Vec<String> {
        let missing: Vec<String> = self
            .projects
            .iter()
            .filter(|(_, path)| !path.is_dir())
            .map(|(name, _)| name.clone())
            .collect();
        for name in &missing {
            self.projects.remove(name);
        }
        missing
    }
}
