//! Deployment mode value object
//!
//! A service is either deployed from a prebuilt image (`localbuild`) or has
//! its source uploaded and built on the remote host (`serverbuild`).

use std::fmt;

/// Label keys that carry the deployment mode, in lookup order.
pub const MODE_LABEL_KEYS: &[&str] = &["graft.mode", "mode"];

/// How a service reaches the remote host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeployMode {
    /// Prebuilt image reference; no source transfer
    #[default]
    LocalBuild,
    /// Source is uploaded and the image is built remotely
    ServerBuild,
}

/// A mode label whose value is neither `localbuild` nor `serverbuild`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown deployment mode in label '{label}'")]
pub struct InvalidModeLabel {
    pub label: String,
}

impl DeployMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployMode::LocalBuild => "localbuild",
            DeployMode::ServerBuild => "serverbuild",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "localbuild" => Some(DeployMode::LocalBuild),
            "serverbuild" => Some(DeployMode::ServerBuild),
            _ => None,
        }
    }

    /// Resolve the mode from a service's labels.
    ///
    /// The first label whose key is one of [`MODE_LABEL_KEYS`] decides; a
    /// service without such a label is `localbuild`.
    pub fn from_labels(labels: &[String]) -> Result<Self, InvalidModeLabel> {
        for label in labels {
            let Some((key, value)) = label.split_once('=') else {
                continue;
            };
            if !MODE_LABEL_KEYS.contains(&key.trim()) {
                continue;
            }
            return Self::parse(value).ok_or_else(|| InvalidModeLabel {
                label: label.clone(),
            });
        }
        Ok(DeployMode::LocalBuild)
    }

    pub fn needs_source(&self) -> bool {
        matches!(self, DeployMode::ServerBuild)
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
