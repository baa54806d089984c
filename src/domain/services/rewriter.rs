//! Manifest rewriting
//!
//! Points each serverbuild service's build context at the directory its
//! source was uploaded to. Works line by line on the original text so
//! comments, ordering and formatting survive; only the matched `context:` or
//! `build:` lines change.

use regex::Regex;

use crate::domain::entities::ContextRewrite;

pub struct ManifestRewriter;

impl ManifestRewriter {
    /// Apply every rewrite to `text`.
    ///
    /// Each substitution is confined to its service's block under
    /// `services:`. A service whose block cannot be located (flow-style
    /// YAML, for instance) is left untouched with a warning.
    pub fn rewrite(text: &str, rewrites: &[ContextRewrite]) -> String {
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();

        for rewrite in rewrites {
            let patterns = LinePatterns::new(&rewrite.original_context);
            let new_context = rewrite.new_context();

            let Some(range) = service_block(&lines, &rewrite.service) else {
                log::warn!(
                    "service '{}' block not found in manifest, leaving context '{}' as written",
                    rewrite.service,
                    rewrite.original_context
                );
                continue;
            };

            for line in &mut lines[range] {
                if let Some(updated) = patterns.apply(line, &new_context) {
                    *line = updated;
                }
            }
        }

        lines.concat()
    }
}

struct LinePatterns {
    context: Regex,
    build: Regex,
}

impl LinePatterns {
    fn new(original: &str) -> Self {
        let escaped = regex::escape(original);
        let pattern = |key: &str| {
            format!(
                r#"^(\s+){}:[ \t]*["']?{}["']?([ \t]*(?:#.*)?)$"#,
                key, escaped
            )
        };
        Self {
            context: compile(&pattern("context")),
            build: compile(&pattern("build")),
        }
    }

    /// Rewrite one line, keeping its line ending. `None` when nothing matched.
    fn apply(&self, line: &str, new_context: &str) -> Option<String> {
        let (body, ending) = split_line_ending(line);
        for (key, re) in [("context", &self.context), ("build", &self.build)] {
            if let Some(caps) = re.captures(body) {
                return Some(format!(
                    "{}{}: {}{}{}",
                    &caps[1], key, new_context, &caps[2], ending
                ));
            }
        }
        None
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("escaped context pattern should always compile")
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Mapping key of a `key:` line that opens a block, unquoted.
fn block_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let without_comment = match trimmed.find(" #") {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    };
    let key = without_comment.strip_suffix(':')?;
    let key = key
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .or_else(|| key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')))
        .unwrap_or(key);
    Some(key)
}

/// Line range of `service`'s block, header excluded.
fn service_block(lines: &[String], service: &str) -> Option<std::ops::Range<usize>> {
    let services_idx = lines
        .iter()
        .position(|l| indent_of(l) == 0 && block_key(l) == Some("services"))?;

    let mut service_indent = None;
    let mut header = None;
    for (idx, line) in lines.iter().enumerate().skip(services_idx + 1) {
        if !is_content(line) {
            continue;
        }
        let indent = indent_of(line);
        if indent == 0 {
            break;
        }
        let level = *service_indent.get_or_insert(indent);
        if indent == level && block_key(line) == Some(service) {
            header = Some((idx, indent));
            break;
        }
    }

    let (header_idx, header_indent) = header?;
    let end = lines
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .find(|(_, l)| is_content(l) && indent_of(l) <= header_indent)
        .map(|(idx, _)| idx)
        .unwrap_or(lines.len());

    Some(header_idx + 1..end)
}
