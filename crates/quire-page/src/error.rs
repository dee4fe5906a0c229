use std::io;

use quire_renderer::MarkupError;

/// A document failed to render.
#[derive(Debug, thiserror::Error)]
#[error("failed to render {path}: {source}")]
pub struct RenderError {
    /// Source path of the document.
    pub path: String,
    #[source]
    pub source: MarkupError,
}

/// Error returned by [`MarkdownCompiler::compile`](crate::MarkdownCompiler::compile).
///
/// Nothing is cached for a document whose compilation fails.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The markup renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The source file's modification time could not be read.
    #[error("failed to read modification time of {path}: {source}")]
    LastModified {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Page data could not be encoded.
    #[error("failed to encode page data for {path}: {source}")]
    PageData {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CompileError {
    /// Source path of the document that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::Render(e) => &e.path,
            Self::LastModified { path, .. } | Self::PageData { path, .. } => path,
        }
    }
}
