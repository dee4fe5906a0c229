//! Title and description inference from metadata and body text.
//!
//! Metadata is free-form, so every lookup degrades to an empty string when a
//! field is missing or has an unexpected shape.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::frontmatter::Metadata;
use crate::header::deeply_parse_header;

/// First heading line of any depth.
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#+\s+(.*)").unwrap());

/// Resolve the page title.
///
/// First match wins: a truthy `home` flag gives `"Home"`, then the metadata
/// `title`, then the first heading line of the body, else `""`.
#[must_use]
pub fn infer_title(metadata: &Metadata, body: &str) -> String {
    if metadata.get("home").is_some_and(is_truthy) {
        return "Home".to_owned();
    }

    if let Some(title) = metadata.get("title").and_then(scalar_text) {
        return deeply_parse_header(&title);
    }

    HEADING_LINE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| deeply_parse_header(m.as_str().trim()))
        .unwrap_or_default()
}

/// Resolve the page description from `head` meta tags.
///
/// Looks for `["meta", {"name": "description", "content": "..."}]` entries in
/// the metadata `head` list and returns the first non-empty content.
#[must_use]
pub fn infer_description(metadata: &Metadata) -> String {
    let Some(Value::Array(head)) = metadata.get("head") else {
        return String::new();
    };

    head.iter()
        .filter_map(|entry| match entry.as_array()?.as_slice() {
            [Value::String(tag), Value::Object(attrs), ..] if tag == "meta" => Some(attrs),
            _ => None,
        })
        .filter(|attrs| attrs.get("name").and_then(Value::as_str) == Some("description"))
        .find_map(|attrs| attrs.get("content").and_then(scalar_text))
        .unwrap_or_default()
}

/// Loose truthiness: `true`, non-empty strings, non-zero numbers, and any
/// sequence or mapping.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of a truthy scalar; `false`, zero and empty strings count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
