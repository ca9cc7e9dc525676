//! Metadata extraction from markdown text
//!
//! Parses the YAML front matter block, ATX headings and `[[wiki-link]]`
//! targets. Used by [`super::FsVault`] to play the part of a metadata cache.

use super::{AliasValue, FileMetadata, Result};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,6}[ \t]+(.+?)[ \t#]*$").expect("heading pattern is valid")
});

static WIKI_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]\|#]+)(?:#[^\]\|]*)?(?:\|[^\]]*)?\]\]")
        .expect("wiki link pattern is valid")
});

/// Split off the front matter mapping, if any
///
/// # Errors
/// Returns [`super::HostError::Frontmatter`] when the block is not valid YAML.
pub fn parse_frontmatter(content: &str) -> Result<(Option<Mapping>, &str)> {
    let Some(rest) = content.strip_prefix("---") else {
        return Ok((None, content));
    };
    let Some(end) = rest.find("\n---") else {
        return Ok((None, content));
    };

    let yaml = rest[..end].trim();
    let body_start = rest[end + 4..].find('\n').map_or(rest.len(), |i| end + 4 + i + 1);
    let body = &rest[body_start.min(rest.len())..];

    if yaml.is_empty() {
        return Ok((None, body));
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok((Some(map), body)),
        _ => Ok((None, body)),
    }
}

/// Title, aliases, headings and links of a markdown document
///
/// Broken front matter is logged and skipped; the body is still scanned.
#[must_use]
pub fn parse_metadata(content: &str) -> FileMetadata {
    let (frontmatter, body) = match parse_frontmatter(content) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::warn!("Ignoring front matter: {e}");
            (None, content)
        }
    };

    let mut metadata = FileMetadata::default();
    if let Some(map) = frontmatter {
        metadata.title = map.get("title").and_then(scalar_string);
        metadata.aliases = map
            .get("aliases")
            .or_else(|| map.get("alias"))
            .and_then(alias_value);
    }

    let mut headings = Vec::new();
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = HEADING_RE.captures(line) {
            headings.push(caps[1].trim().to_string());
        }
    }
    if !headings.is_empty() {
        metadata.headings = Some(headings);
    }

    metadata.links = WIKI_LINK_RE
        .captures_iter(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|link| !link.is_empty())
        .collect();

    metadata
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn alias_value(value: &Value) -> Option<AliasValue> {
    match value {
        Value::Sequence(items) => Some(AliasValue::List(
            items.iter().filter_map(scalar_string).collect(),
        )),
        other => scalar_string(other).map(AliasValue::Text),
    }
}
