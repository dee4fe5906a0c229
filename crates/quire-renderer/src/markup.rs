//! The markup rendering capability and its pulldown-cmark implementation.

use std::sync::Arc;

use crate::code_block::CodeBlockProcessor;
use crate::error::MarkupError;
use crate::hoist::HoistedDeclarations;
use crate::renderer::MarkdownRenderer;
use crate::state::HeadingEntry;

/// Output of rendering one document body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedMarkup {
    /// Rendered template markup.
    pub markup: String,
    /// Heading outline in document order.
    pub headers: Vec<HeadingEntry>,
    /// Fragments lifted out of the markup.
    pub hoisted: HoistedDeclarations,
    /// Non-fatal warnings reported by code block processors.
    pub warnings: Vec<String>,
}

/// Turns a document body into markup plus auxiliary declarations.
///
/// Implementations must be a pure function of `body` and of configuration
/// fixed at construction: compiled output is cached by document text alone.
pub trait MarkupRenderer: Send + Sync {
    /// Render a document body.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError`] when the body cannot be rendered.
    fn render(&self, body: &str) -> Result<RenderedMarkup, MarkupError>;

    /// Stable description of the configuration that shapes the output.
    ///
    /// Persistent caches fold it into their version so that entries rendered
    /// with other options are discarded.
    fn fingerprint(&self) -> String {
        String::new()
    }
}

/// Output-shaping options of [`HtmlRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct RendererOptions {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists, alerts.
    pub gfm: bool,
    /// Heading levels reported in the outline.
    pub header_levels: Vec<u8>,
    /// Prepend a `#` permalink to every heading.
    pub header_anchors: bool,
    /// Open external links in a new tab.
    pub external_links_new_tab: bool,
    /// Register PascalCase elements found in raw HTML as components.
    pub register_components: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            header_levels: vec![2, 3],
            header_anchors: true,
            external_links_new_tab: true,
            register_components: true,
        }
    }
}

impl RendererOptions {
    /// Stable textual form of the options.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let levels: Vec<String> = self.header_levels.iter().map(u8::to_string).collect();
        format!(
            "gfm={};levels={};anchors={};new_tab={};components={}",
            self.gfm,
            levels.join(","),
            self.header_anchors,
            self.external_links_new_tab,
            self.register_components
        )
    }
}

type ProcessorFactory = Arc<dyn Fn() -> Box<dyn CodeBlockProcessor> + Send + Sync>;

/// [`MarkupRenderer`] producing HTML with pulldown-cmark.
///
/// Code block processors are registered as named factories. Every render gets
/// a fresh set of processors, so a processor may keep per-document state.
///
/// # Example
///
/// ```
/// use quire_renderer::{HtmlRenderer, MarkupRenderer};
///
/// let rendered = HtmlRenderer::default().render("## Usage\n\nRun it.").unwrap();
/// assert_eq!(rendered.headers[0].anchor_id, "usage");
/// ```
#[derive(Clone, Default)]
pub struct HtmlRenderer {
    options: RendererOptions,
    processors: Vec<(String, ProcessorFactory)>,
}

impl HtmlRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: RendererOptions) -> Self {
        Self {
            options,
            processors: Vec::new(),
        }
    }

    /// Register a code block processor factory under `name`.
    ///
    /// The name is part of the fingerprint. Processors are consulted in
    /// registration order.
    #[must_use]
    pub fn with_processor<F, P>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: CodeBlockProcessor + 'static,
    {
        let factory: ProcessorFactory = Arc::new(move || Box::new(factory()));
        self.processors.push((name.into(), factory));
        self
    }

    /// Options the renderer was built with.
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }
}

impl MarkupRenderer for HtmlRenderer {
    fn render(&self, body: &str) -> Result<RenderedMarkup, MarkupError> {
        let processors = self.processors.iter().map(|(_, make)| make()).collect();
        MarkdownRenderer::new(&self.options, processors).render(body)
    }

    fn fingerprint(&self) -> String {
        let mut fingerprint = self.options.fingerprint();
        for (name, _) in &self.processors {
            fingerprint.push_str(";processor=");
            fingerprint.push_str(name);
        }
        fingerprint
    }
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.processors.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("HtmlRenderer")
            .field("options", &self.options)
            .field("processors", &names)
            .finish()
    }
}
