//! Ignore patterns value object
//!
//! The exclusion set for a service's source tree: a fixed list of
//! dependency caches, build outputs and logs, plus the patterns from the
//! service directory's `.gitignore`. The same set drives both the rsync
//! `--exclude` arguments and the archive fallback's walker.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Ignore file read from the root of each build context
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Always excluded, whatever the ignore file says
pub const BUILTIN_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    ".next",
    "__pycache__",
    ".venv",
    "target",
    "dist",
    "build",
    "*.log",
    "logs",
];

/// Bytes read from the ignore file (64KB); the rest is skipped
const MAX_FILE_SIZE: u64 = 65536;

/// Patterns taken from the ignore file; later ones are skipped
const MAX_PATTERNS: usize = 1000;

/// Exclusion patterns for one source tree.
///
/// Negated patterns (`!keep.me`) are dropped rather than inverted: rsync and
/// the archive walker only ever see a plain exclusion list.
#[derive(Debug)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
    matcher: Gitignore,
}

impl IgnorePatterns {
    /// Only the builtin exclusions.
    pub fn builtin(root: &Path) -> Result<Self, IgnoreError> {
        Self::from_content(root, &root.join(IGNORE_FILE_NAME), "")
    }

    /// Load the builtin exclusions plus the context's `.gitignore`.
    ///
    /// A missing ignore file is not an error. An oversized one is read up to
    /// the last complete line within the limit, with a warning.
    pub fn load(root: &Path) -> Result<Self, IgnoreError> {
        let ignore_path = root.join(IGNORE_FILE_NAME);

        if !ignore_path.is_file() {
            return Self::builtin(root);
        }

        let io_err = |source: io::Error| IgnoreError::Io {
            path: ignore_path.clone(),
            source,
        };
        let file = fs::File::open(&ignore_path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();

        let mut bytes = Vec::new();
        file.take(MAX_FILE_SIZE)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
        if size > MAX_FILE_SIZE {
            log::warn!(
                "{} is {} bytes, only the first {}KB are used",
                ignore_path.display(),
                size,
                MAX_FILE_SIZE / 1024
            );
            let end = bytes
                .iter()
                .rposition(|b| *b == b'\n')
                .map_or(0, |newline| newline + 1);
            bytes.truncate(end);
        }

        let content = String::from_utf8(bytes)
            .map_err(|e| io_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        Self::from_content(root, &ignore_path, &content)
    }

    /// Parse ignore file content on top of the builtin exclusions.
    pub fn from_content(root: &Path, source_path: &Path, content: &str) -> Result<Self, IgnoreError> {
        let mut patterns: Vec<String> = BUILTIN_EXCLUDES.iter().map(|p| p.to_string()).collect();
        let mut from_file = 0;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.starts_with('!') {
                log::debug!("dropping negated pattern '{}' from {}", trimmed, source_path.display());
                continue;
            }

            from_file += 1;
            if from_file > MAX_PATTERNS {
                log::warn!(
                    "{} has more than {} patterns, ignoring the rest",
                    source_path.display(),
                    MAX_PATTERNS
                );
                break;
            }

            if !patterns.iter().any(|p| p == trimmed) {
                patterns.push(trimmed.to_string());
            }
        }

        let mut builder = GitignoreBuilder::new(root);
        for pattern in &patterns {
            builder
                .add_line(Some(source_path.to_path_buf()), pattern)
                .map_err(|e| IgnoreError::InvalidPattern {
                    path: source_path.to_path_buf(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self { patterns, matcher })
    }

    /// Check a path relative to the tree root.
    pub fn is_excluded(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    /// The patterns in the order rsync receives them.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn rsync_args(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|p| format!("--exclude={}", p))
            .collect()
    }
}

/// Errors that can occur when loading ignore patterns.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    #[error("invalid pattern in {}: '{pattern}' - {message}", .path.display())]
    InvalidPattern {
        path: PathBuf,
        pattern: String,
        message: String,
    },

    #[error("failed to build ignore matcher: {0}")]
    BuildFailed(String),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
