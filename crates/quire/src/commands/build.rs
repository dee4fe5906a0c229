//! `quire build` command implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use quire_config::{CliSettings, SiteConfig, SiteData};
use quire_page::{CompiledArtifact, MarkdownCompiler, RawDocument};
use rayon::prelude::*;
use serde::Serialize;

use super::site_compiler;
use crate::error::CliError;
use crate::output::Output;

const SITE_DATA_FILE: &str = "site-data.json";
const MANIFEST_FILE: &str = "pages.json";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Site root directory.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output directory (overrides config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            out_dir: self.out_dir,
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = SiteConfig::load(&self.root, Some(&cli_settings))?;

        output.location("Source", &config.root);
        output.location("Output", &config.out_dir);

        let compiler = site_compiler(&config, version);
        let start = Instant::now();
        let report = build_site(&config, &compiler)?;

        for failure in &report.failures {
            output.page_failed(&failure.page, &failure.error);
        }

        let total = config.pages.len();
        if !report.failures.is_empty() {
            return Err(CliError::Build {
                failed: report.failures.len(),
                total,
            });
        }

        tracing::info!(pages = total, elapsed_ms = start.elapsed().as_millis(), "build finished");
        output.built(total, &config.out_dir);
        Ok(())
    }
}

/// Manifest entry of one built page.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageEntry {
    relative_path: String,
    route: String,
    title: String,
    description: String,
    last_updated: i64,
}

/// Page that could not be built.
#[derive(Debug)]
struct PageFailure {
    page: String,
    error: CliError,
}

/// Result of building a site with partial failures.
#[derive(Debug)]
struct BuildReport {
    pages: Vec<PageEntry>,
    failures: Vec<PageFailure>,
}

/// Compile every page of `config` in parallel and write the output tree.
///
/// Page failures are collected rather than aborting the build; the site data
/// and manifest are written for the pages that succeeded.
fn build_site(config: &SiteConfig, compiler: &MarkdownCompiler) -> Result<BuildReport, CliError> {
    fs::create_dir_all(&config.out_dir)?;

    let results: Vec<(&String, Result<PageEntry, CliError>)> = config
        .pages
        .par_iter()
        .map(|page| (page, build_page(config, compiler, page)))
        .collect();

    let mut pages = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (page, result) in results {
        match result {
            Ok(entry) => pages.push(entry),
            Err(error) => failures.push(PageFailure {
                page: page.clone(),
                error,
            }),
        }
    }

    fs::write(
        config.out_dir.join(SITE_DATA_FILE),
        serde_json::to_string_pretty(&config.site)?,
    )?;
    fs::write(
        config.out_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&pages)?,
    )?;

    Ok(BuildReport { pages, failures })
}

/// Compile one page and write its component next to its siblings in the
/// output directory.
fn build_page(
    config: &SiteConfig,
    compiler: &MarkdownCompiler,
    page: &str,
) -> Result<PageEntry, CliError> {
    let source_path = config.root.join(page);
    let text = fs::read_to_string(&source_path)?;
    let source = source_path.to_string_lossy();
    let artifact = compiler.compile(&RawDocument::new(&text, &source))?;

    let target = config.out_dir.join(Path::new(page).with_extension("vue"));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &artifact.renderable_source)?;

    Ok(manifest_entry(&config.site, page, artifact))
}

fn manifest_entry(site: &SiteData, page: &str, artifact: CompiledArtifact) -> PageEntry {
    let route = page_route(&site.base, page);
    let data = artifact.page_data;
    let (title, description) = if data.title.is_empty() || data.description.is_empty() {
        let resolved = site.resolve_by_route(&route);
        (
            non_empty_or(data.title, resolved.title),
            non_empty_or(data.description, resolved.description),
        )
    } else {
        (data.title, data.description)
    };

    PageEntry {
        // The artifact may come from a cache entry of a file with identical
        // text, so the manifest uses the path it was built for.
        relative_path: page.to_owned(),
        route,
        title,
        description,
        last_updated: data.last_updated,
    }
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.is_empty() { fallback } else { value }
}

/// Public route of a page, including the site base.
///
/// `guide/index.md` maps to `{base}guide/`, `guide/setup.md` to
/// `{base}guide/setup.html`.
fn page_route(base: &str, page: &str) -> String {
    let stem = page.strip_suffix(".md").unwrap_or(page);
    let path = if stem == "index" {
        String::new()
    } else if let Some(dir) = stem.strip_suffix("/index") {
        format!("{dir}/")
    } else {
        format!("{stem}.html")
    };
    format!("{base}{path}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use quire_config::LocaleConfig;
    use quire_page::PageData;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn artifact(title: &str, description: &str) -> CompiledArtifact {
        CompiledArtifact {
            renderable_source: String::new(),
            page_data: PageData {
                title: title.to_owned(),
                description: description.to_owned(),
                last_updated: 7,
                ..PageData::default()
            },
        }
    }

    #[test]
    fn test_page_route() {
        assert_eq!(page_route("/", "index.md"), "/");
        assert_eq!(page_route("/", "guide/index.md"), "/guide/");
        assert_eq!(page_route("/", "guide/setup.md"), "/guide/setup.html");
        assert_eq!(page_route("/docs/", "api.md"), "/docs/api.html");
        assert_eq!(page_route("/", "reindex.md"), "/reindex.html");
    }

    #[test]
    fn test_manifest_entry_keeps_page_values() {
        let entry = manifest_entry(&SiteData::default(), "a.md", artifact("A", "About A"));
        assert_eq!(
            entry,
            PageEntry {
                relative_path: "a.md".to_owned(),
                route: "/a.html".to_owned(),
                title: "A".to_owned(),
                description: "About A".to_owned(),
                last_updated: 7,
            }
        );
    }

    #[test]
    fn test_manifest_entry_falls_back_to_locale_site_data() {
        let mut locales = BTreeMap::new();
        locales.insert(
            "/fr/".to_owned(),
            LocaleConfig {
                title: Some("Documentation".to_owned()),
                description: Some("Le site".to_owned()),
                ..LocaleConfig::default()
            },
        );
        let site = SiteData {
            locales,
            ..SiteData::default()
        };

        let entry = manifest_entry(&site, "fr/index.md", artifact("", ""));
        assert_eq!(entry.title, "Documentation");
        assert_eq!(entry.description, "Le site");

        let entry = manifest_entry(&site, "index.md", artifact("Accueil", ""));
        assert_eq!(entry.title, "Accueil");
        assert_eq!(entry.description, "A Quire site");
    }

    #[test]
    fn test_build_site_writes_output_tree() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "index.md", "---\nhome: true\n---\n# Welcome\n");
        write(tmp.path(), "guide/setup.md", "# Setup\n\n## Install\n");
        write(tmp.path(), ".quire/config.toml", "title = \"Manual\"\n");

        let config = SiteConfig::load(tmp.path(), None).unwrap();
        let compiler = site_compiler(&config, "test");
        let report = build_site(&config, &compiler).unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.pages.len(), 2);

        let out = tmp.path().join("dist");
        let setup = fs::read_to_string(out.join("guide/setup.vue")).unwrap();
        assert!(setup.starts_with("<script>"));
        assert!(setup.contains("export const __pageData"));
        assert!(out.join("index.vue").is_file());

        let site: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(SITE_DATA_FILE)).unwrap()).unwrap();
        assert_eq!(site["title"], "Manual");
        assert_eq!(site["base"], "/");

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest[0]["relativePath"], "guide/setup.md");
        assert_eq!(manifest[0]["title"], "Setup");
        assert_eq!(manifest[0]["route"], "/guide/setup.html");
        assert_eq!(manifest[1]["title"], "Home");
    }

    #[test]
    fn test_build_site_identical_pages_keep_own_paths() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.md", "# Same\n");
        write(tmp.path(), "b.md", "# Same\n");

        let config = SiteConfig::load(tmp.path(), None).unwrap();
        let compiler = site_compiler(&config, "test");
        let report = build_site(&config, &compiler).unwrap();

        let paths: Vec<&str> = report.pages.iter().map(|p| p.relative_path.as_str()).collect();
        assert_eq!(paths, ["a.md", "b.md"]);
        assert!(tmp.path().join("dist/a.vue").is_file());
        assert!(tmp.path().join("dist/b.vue").is_file());
    }

    #[test]
    fn test_build_site_collects_failures() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "good.md", "# Good\n");
        write(tmp.path(), "bad.md", "# Bad\n");

        let config = SiteConfig::load(tmp.path(), None).unwrap();
        let compiler = site_compiler(&config, "test");
        // Remove a page after discovery so that reading it fails.
        fs::remove_file(tmp.path().join("bad.md")).unwrap();

        let report = build_site(&config, &compiler).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].page, "bad.md");
        assert!(matches!(report.failures[0].error, CliError::Io(_)));
        assert!(tmp.path().join("dist/good.vue").is_file());
    }

    #[test]
    fn test_persistent_cache_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "index.md", "# Cached\n");
        write(tmp.path(), ".quire/config.toml", "[cache]\ndir = \".quire/cache\"\n");

        let config = SiteConfig::load(tmp.path(), None).unwrap();
        build_site(&config, &site_compiler(&config, "test")).unwrap();

        let cache_dir = tmp.path().join(".quire/cache");
        let version = fs::read_to_string(cache_dir.join("VERSION")).unwrap();
        assert!(version.starts_with("test+gfm=true"));

        let entries: usize = fs::read_dir(&cache_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .map(|shard| fs::read_dir(shard.path()).unwrap().count())
            .sum();
        assert_eq!(entries, 1);

        // A second build with a fresh compiler reuses the directory as is.
        build_site(&config, &site_compiler(&config, "test")).unwrap();
        assert_eq!(fs::read_to_string(cache_dir.join("VERSION")).unwrap(), version);
    }
}
