//! Markdown page compilation.
//!
//! This crate turns markdown documents into page components for the site
//! runtime:
//! - [`frontmatter`]: YAML/TOML metadata block extraction
//! - [`infer_title`] / [`infer_description`]: page metadata inference
//! - [`MarkdownCompiler`]: the cached compilation pipeline
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use quire_cache::LruCache;
//! use quire_page::{CompiledArtifact, MarkdownCompiler, RawDocument};
//! use quire_renderer::HtmlRenderer;
//!
//! let compiler = MarkdownCompiler::new(
//!     "docs",
//!     Arc::new(HtmlRenderer::default()),
//!     Arc::new(LruCache::<CompiledArtifact>::default()),
//! );
//!
//! let text = std::fs::read_to_string("docs/guide.md")?;
//! let artifact = compiler.compile(&RawDocument::new(&text, "docs/guide.md"))?;
//! println!("{}", artifact.page_data.title);
//! # Ok(())
//! # }
//! ```

mod artifact;
mod compiler;
mod error;
pub mod frontmatter;
mod header;
mod inference;
mod page_data;
mod path;

pub use artifact::sanitize;
pub use compiler::{FsLastModified, LastModified, MarkdownCompiler};
pub use error::{CompileError, RenderError};
pub use frontmatter::{FrontMatter, FrontMatterError, Metadata};
pub use header::deeply_parse_header;
pub use inference::{infer_description, infer_title};
pub use page_data::{CompiledArtifact, PageData, RawDocument};
pub use path::relative_path;

// Re-export HeadingEntry from quire-renderer for convenience
pub use quire_renderer::HeadingEntry;
