//! Document compilation pipeline.
//!
//! [`MarkdownCompiler`] turns a [`RawDocument`] into a [`CompiledArtifact`]:
//!
//! ```text
//! cache lookup -> front matter -> render -> inference -> assembly -> cache insert
//! ```
//!
//! The cache is keyed by the raw document text alone. Two files with identical
//! text share one entry, including its `relativePath` and `lastUpdated`, and
//! renderer options are expected to stay fixed for the lifetime of the cache.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use quire_cache::Cache;
use quire_renderer::MarkupRenderer;

use crate::artifact::{assemble, inject_components, inject_page_data, sanitize};
use crate::error::{CompileError, RenderError};
use crate::frontmatter::{self, FrontMatter, Metadata};
use crate::inference::{infer_description, infer_title};
use crate::page_data::{CompiledArtifact, PageData, RawDocument};
use crate::path::relative_path;

/// Source of file modification times.
pub trait LastModified: Send + Sync {
    /// Modification time of `path` in epoch milliseconds.
    fn last_modified(&self, path: &Path) -> io::Result<i64>;
}

/// [`LastModified`] reading file-system metadata, rounded to the nearest
/// millisecond.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLastModified;

impl LastModified for FsLastModified {
    fn last_modified(&self, path: &Path) -> io::Result<i64> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(epoch_millis(modified))
    }
}

fn epoch_millis(time: SystemTime) -> i64 {
    let nanos = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i128::try_from(after.as_nanos()).unwrap_or(i128::MAX),
        Err(before) => -i128::try_from(before.duration().as_nanos()).unwrap_or(i128::MAX),
    };
    let millis = nanos.saturating_add(500_000).div_euclid(1_000_000);
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}

/// Compiles markdown documents into page components.
///
/// Safe to share across threads; `compile` may run concurrently for many
/// documents against one cache.
pub struct MarkdownCompiler {
    root: String,
    renderer: Arc<dyn MarkupRenderer>,
    cache: Arc<dyn Cache<CompiledArtifact>>,
    last_modified: Arc<dyn LastModified>,
}

impl MarkdownCompiler {
    /// Create a compiler for documents below `root`.
    ///
    /// Modification times come from the file system; see
    /// [`with_last_modified`](Self::with_last_modified).
    pub fn new(
        root: impl AsRef<Path>,
        renderer: Arc<dyn MarkupRenderer>,
        cache: Arc<dyn Cache<CompiledArtifact>>,
    ) -> Self {
        Self {
            root: root.as_ref().to_string_lossy().into_owned(),
            renderer,
            cache,
            last_modified: Arc::new(FsLastModified),
        }
    }

    /// Replace the source of modification times.
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: Arc<dyn LastModified>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Site root used to compute relative paths.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Compile one document.
    ///
    /// A cached artifact for identical text is returned as is. Otherwise the
    /// document is rendered, assembled and cached. Malformed front matter is
    /// logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when rendering fails or the modification time
    /// cannot be read. Nothing is cached in that case.
    pub fn compile(&self, document: &RawDocument<'_>) -> Result<CompiledArtifact, CompileError> {
        let relative_path = relative_path(&self.root, document.source_path);

        if let Some(cached) = self.cache.get(document.text) {
            tracing::debug!("[cache hit] {relative_path}");
            return Ok(cached);
        }

        let start = Instant::now();

        let FrontMatter { metadata, body } = match frontmatter::extract(document.text) {
            Ok(front_matter) => front_matter,
            Err(e) => {
                tracing::warn!(path = %document.source_path, error = %e, "ignoring invalid front matter");
                FrontMatter {
                    metadata: Metadata::new(),
                    body: document.text,
                }
            }
        };

        let rendered = self.renderer.render(body).map_err(|source| RenderError {
            path: document.source_path.to_owned(),
            source,
        })?;
        for warning in &rendered.warnings {
            tracing::warn!(path = %document.source_path, "{warning}");
        }

        let last_updated = self
            .last_modified
            .last_modified(Path::new(document.source_path))
            .map_err(|source| CompileError::LastModified {
                path: document.source_path.to_owned(),
                source,
            })?;

        let markup = sanitize(&rendered.markup);
        let page_data = PageData {
            title: infer_title(&metadata, body),
            description: infer_description(&metadata),
            frontmatter: metadata,
            headers: rendered.headers,
            relative_path,
            last_updated,
        };

        let mut hoisted = rendered.hoisted;
        inject_components(&mut hoisted);
        inject_page_data(&mut hoisted, &page_data).map_err(|source| CompileError::PageData {
            path: document.source_path.to_owned(),
            source,
        })?;

        let artifact = CompiledArtifact {
            renderable_source: assemble(&hoisted, &markup),
            page_data,
        };

        tracing::debug!(
            "[render] {} in {}ms",
            document.source_path,
            start.elapsed().as_millis()
        );

        self.cache.set(document.text, artifact.clone());
        Ok(artifact)
    }
}
