//! Markdown to template markup rendering.
//!
//! [`MarkupRenderer`] is the capability the page pipeline consumes: it turns a
//! document body into markup, a heading outline and [`HoistedDeclarations`].
//! [`HtmlRenderer`] implements it on top of pulldown-cmark.
//!
//! # Example
//!
//! ```
//! use quire_renderer::{HtmlRenderer, MarkupRenderer, RendererOptions};
//!
//! let renderer = HtmlRenderer::new(RendererOptions::default());
//! let rendered = renderer
//!     .render("## Hello\n\n<script setup>\nconst n = 1\n</script>\n")
//!     .unwrap();
//!
//! assert_eq!(rendered.headers[0].text, "Hello");
//! assert_eq!(rendered.hoisted.script, vec!["const n = 1".to_owned()]);
//! ```

mod code_block;
mod error;
mod hoist;
mod html;
mod markup;
mod renderer;
mod state;

pub use code_block::{CodeBlockProcessor, ProcessResult};
pub use error::MarkupError;
pub use hoist::{DeclarationKind, HoistedDeclarations};
pub use markup::{HtmlRenderer, MarkupRenderer, RenderedMarkup, RendererOptions};
pub use state::{HeadingEntry, escape_html, slugify};
