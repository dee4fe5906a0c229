//! Compiled page types.

use quire_renderer::HeadingEntry;
use serde::{Deserialize, Serialize};

use crate::frontmatter::Metadata;

/// Source document submitted for compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDocument<'a> {
    /// Full document text, including any front matter.
    pub text: &'a str,
    /// Path of the source file, absolute or relative to the working directory.
    pub source_path: &'a str,
}

impl<'a> RawDocument<'a> {
    #[must_use]
    pub fn new(text: &'a str, source_path: &'a str) -> Self {
        Self { text, source_path }
    }
}

/// Structured metadata of a compiled page.
///
/// Serialized with the camelCase keys the page runtime reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub title: String,
    pub description: String,
    pub frontmatter: Metadata,
    pub headers: Vec<HeadingEntry>,
    /// Path relative to the site root, always `/`-separated.
    pub relative_path: String,
    /// Last modification time in epoch milliseconds.
    pub last_updated: i64,
}

/// Output of compiling one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    /// Script, style and template segments of the page component.
    pub renderable_source: String,
    pub page_data: PageData,
}
