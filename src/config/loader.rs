//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use super::types::Config;

pub const PROJECT_CONFIG: &str = ".graft/config.toml";
pub const ENV_PREFIX: &str = "GRAFT_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}\n  → Fix: Check the TOML syntax and value types", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("no deploy host configured\n  → Fix: Set `host` under [server] in .graft/config.toml\n  → Or: export GRAFT_HOST=<host>")]
    MissingHost,

    #[error("invalid value for {var}: '{value}' ({message})")]
    InvalidEnv {
        var: String,
        value: String,
        message: String,
    },
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Effective configuration and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

pub fn load_or_default(project_root: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let loaded = load_layered(project_root, user_config_path().as_deref())?;
    Ok(LoadedConfig {
        config: with_env_overrides(loaded.config, |var| std::env::var(var).ok())?,
        ..loaded
    })
}

/// First existing file wins: project, then user. No file means defaults.
pub fn load_layered(
    project_root: Option<&Path>,
    user_config: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    let candidates = project_root
        .map(|root| root.join(PROJECT_CONFIG))
        .into_iter()
        .chain(user_config.map(Path::to_path_buf));

    for candidate in candidates {
        if candidate.is_file() {
            let (config, warnings) = load_with_warnings(&candidate)?;
            log::debug!("loaded config from {}", candidate.display());
            return Ok(LoadedConfig {
                config,
                source: Some(candidate),
                warnings,
            });
        }
    }

    Ok(LoadedConfig {
        config: Config::default(),
        source: None,
        warnings: Vec::new(),
    })
}

/// Apply `GRAFT_HOST`, `GRAFT_PORT`, `GRAFT_USER`, `GRAFT_KEY_PATH` and
/// `GRAFT_REMOTE_ROOT`. `lookup` is `std::env::var` outside tests.
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.trim().is_empty())
    };

    if let Some(host) = var("HOST") {
        config.server.host = Some(host);
    }

    if let Some(port) = var("PORT") {
        config.server.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnv {
                var: format!("{}PORT", ENV_PREFIX),
                value: port.clone(),
                message: e.to_string(),
            }
        })?;
    }

    if let Some(user) = var("USER") {
        config.server.user = user;
    }

    if let Some(key) = var("KEY_PATH") {
        config.server.key_path = Some(PathBuf::from(key));
    }

    if let Some(root) = var("REMOTE_ROOT") {
        config.deploy.remote_root = root;
    }

    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(PROJECT_CONFIG))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "server",
        "host",
        "port",
        "user",
        "key_path",
        "deploy",
        "remote_root",
        "registry_path",
        "use_sudo",
        "manifest",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
