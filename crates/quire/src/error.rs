//! CLI error types.

use quire_config::ConfigError;
use quire_page::CompileError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{failed} of {total} pages failed to build")]
    Build { failed: usize, total: usize },
}
