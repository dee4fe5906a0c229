//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod compile;

pub(crate) use build::BuildArgs;
pub(crate) use compile::CompileArgs;

use std::sync::Arc;

use quire_cache::{Cache, FileCache, LruCache, NullCache, TieredCache};
use quire_config::SiteConfig;
use quire_page::{CompiledArtifact, MarkdownCompiler};
use quire_renderer::{HtmlRenderer, MarkupRenderer};

/// Create the compiler for a site, with the cache its configuration asks for.
///
/// The persistent tier is versioned by the CLI version and the renderer
/// fingerprint, so changing either discards stale entries.
pub(crate) fn site_compiler(config: &SiteConfig, version: &str) -> MarkdownCompiler {
    let renderer = HtmlRenderer::new(config.markdown.clone());
    let cache: Arc<dyn Cache<CompiledArtifact>> = if !config.cache.enabled {
        Arc::new(NullCache)
    } else if let Some(dir) = &config.cache.dir {
        let cache_version = format!("{version}+{}", renderer.fingerprint());
        Arc::new(TieredCache::new(
            config.cache.capacity,
            FileCache::new(dir.clone(), &cache_version),
        ))
    } else {
        Arc::new(LruCache::new(config.cache.capacity))
    };

    MarkdownCompiler::new(&config.root, Arc::new(renderer), cache)
}
