//! Code block processor trait for extensible code block handling.
//!
//! Processors are the renderer's extension mechanism. They are registered on
//! [`HtmlRenderer`](crate::HtmlRenderer) as factories, and a fresh set is
//! created for every render, so processors may keep per-document state.
//!
//! When a fenced code block is encountered, processors are consulted in
//! registration order; the first returning a non-`PassThrough` result wins.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use quire_renderer::{CodeBlockProcessor, ProcessResult};
//!
//! struct Shout;
//!
//! impl CodeBlockProcessor for Shout {
//!     fn process(
//!         &mut self,
//!         language: &str,
//!         _attrs: &HashMap<String, String>,
//!         source: &str,
//!         _index: usize,
//!     ) -> ProcessResult {
//!         if language == "shout" {
//!             ProcessResult::Inline(format!("<p>{}</p>", source.trim().to_uppercase()))
//!         } else {
//!             ProcessResult::PassThrough
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace code block with a placeholder, resolved in
    /// [`CodeBlockProcessor::post_process`].
    Placeholder(String),

    /// Replace code block with inline markup immediately.
    Inline(String),

    /// Render as a regular code block.
    PassThrough,

    /// The block is invalid; the whole render fails with this message.
    Error(String),
}

/// Trait for processing special code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block and return the result.
    ///
    /// # Arguments
    ///
    /// * `language` - Language identifier from fence info string
    /// * `attrs` - Attributes parsed from fence (key=value pairs)
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based index for placeholder generation
    fn process(
        &mut self,
        language: &str,
        attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult;

    /// Post-process rendered markup to replace placeholders.
    ///
    /// Default implementation is a no-op.
    fn post_process(&mut self, _markup: &mut String) {}

    /// Get warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}
