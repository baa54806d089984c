//! Secret store value object
//!
//! A flat `KEY=value` mapping read from the project's secret file, and the
//! `${KEY}` substitution applied to the manifest before upload.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Secrets loaded from `KEY=value` lines.
///
/// The backing file is append-only, so a key written twice resolves to its
/// last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretStore {
    entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("secret key must not be empty")]
    EmptyKey,

    #[error("secret key '{key}' must not contain '=', '{{', '}}' or whitespace")]
    InvalidKey { key: String },

    #[error("value for secret '{key}' must be a single line")]
    MultilineValue { key: String },

    #[error("secret '{key}' does not resolve: substitution keeps producing ${{{key}}}\n  → Fix: Break the ${{...}} reference cycle in .graft/secrets.env")]
    Cycle { key: String },
}

/// Extra passes allowed beyond one per key before giving up on a cycle.
const EXTRA_PASSES: usize = 2;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^{}\s]+)\}").expect("placeholder regex is valid"))
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `KEY=value` lines. Lines without `=`, blank lines and `#`
    /// comments are skipped; the value is everything after the first `=`.
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.to_string(), value.to_string());
            }
        }
        Self { entries }
    }

    /// Format one entry as an appendable line, validating it first.
    pub fn format_entry(key: &str, value: &str) -> Result<String, SecretError> {
        if key.is_empty() {
            return Err(SecretError::EmptyKey);
        }
        if key
            .chars()
            .any(|c| c == '=' || c == '{' || c == '}' || c.is_whitespace())
        {
            return Err(SecretError::InvalidKey {
                key: key.to_string(),
            });
        }
        if value.contains('\n') || value.contains('\r') {
            return Err(SecretError::MultilineValue {
                key: key.to_string(),
            });
        }
        Ok(format!("{}={}\n", key, value))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Replace every `${KEY}` token whose key is in the store.
    ///
    /// Tokens are matched exactly; unknown placeholders are left as written.
    /// Values may refer to other secrets, so substitution repeats until
    /// no known token is left, which makes a second call a no-op. A chain
    /// that still produces known tokens after every key had its turn is a
    /// cycle.
    pub fn inject(&self, text: &str) -> Result<String, SecretError> {
        let mut current = text.to_string();
        for _ in 0..=self.entries.len() + EXTRA_PASSES {
            if self.first_known_token(&current).is_none() {
                return Ok(current);
            }
            current = self.substitute_once(&current);
        }

        match self.first_known_token(&current) {
            Some(key) => Err(SecretError::Cycle { key }),
            None => Ok(current),
        }
    }

    fn substitute_once(&self, text: &str) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures<'_>| match self.entries.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    fn first_known_token(&self, text: &str) -> Option<String> {
        placeholder_regex()
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .find(|key| self.entries.contains_key(key))
    }
}
