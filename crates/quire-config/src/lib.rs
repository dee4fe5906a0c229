//! Site configuration for Quire.
//!
//! A site is a directory of markdown pages with an optional
//! `.quire/config.toml`. [`SiteConfig::load`] reads that file, resolves
//! [`SiteData`] and output locations, and discovers the pages to build.
//!
//! ## Environment Variable Expansion
//!
//! The `base`, `out_dir` and `cache.dir` settings support:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Example
//!
//! ```toml
//! title = "Handbook"
//! base = "/handbook"
//! head = [["link", { rel = "icon", href = "/favicon.ico" }]]
//! src_exclude = ["drafts/"]
//!
//! [locales."/de/"]
//! lang = "de-DE"
//! label = "Deutsch"
//!
//! [markdown]
//! header_levels = [2, 3, 4]
//!
//! [cache]
//! capacity = 4096
//! dir = "${XDG_CACHE_HOME:-.cache}/quire"
//! ```

mod expand;
mod pages;
mod site;

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use quire_renderer::RendererOptions;
use serde::Deserialize;
use serde_json::{Map, Value};

pub use site::{HeadConfig, LangInfo, LocaleConfig, SiteData};

use site::{DEFAULT_DESCRIPTION, DEFAULT_LANG, DEFAULT_TITLE, non_empty, normalize_base};

/// Directory holding site configuration and theme.
pub const CONFIG_DIR: &str = ".quire";

const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_OUT_DIR: &str = "dist";
const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the output directory.
    pub out_dir: Option<PathBuf>,
    /// Override the cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration as written in `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UserConfig {
    lang: Option<String>,
    base: Option<String>,
    title: Option<String>,
    description: Option<String>,
    head: Vec<HeadConfig>,
    theme_config: Map<String, Value>,
    locales: BTreeMap<String, LocaleConfig>,
    custom_data: Map<String, Value>,
    out_dir: Option<String>,
    src_exclude: Vec<String>,
    markdown: RendererOptions,
    cache: CacheConfigRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    capacity: Option<usize>,
    dir: Option<String>,
}

/// Resolved cache settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether compiled pages are cached at all.
    pub enabled: bool,
    /// Maximum number of entries kept in memory.
    pub capacity: usize,
    /// Directory of the persistent tier, if any.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
            dir: None,
        }
    }
}

/// Fully resolved site configuration.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Site root directory.
    pub root: PathBuf,
    pub site: SiteData,
    /// Location of `config.toml`, whether or not it exists.
    pub config_path: PathBuf,
    /// Custom theme directory, when `.quire/theme` exists.
    pub theme_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    /// Markdown pages as sorted `/`-separated paths relative to `root`.
    pub pages: Vec<String>,
    pub markdown: RendererOptions,
    pub cache: CacheConfig,
    /// Gitignore-style globs of sources skipped during discovery.
    pub src_exclude: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Site root does not exist.
    #[error("Site root not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        /// Error message (e.g., "${`CACHE_DIR`} not set").
        message: String,
    },
    /// Page discovery failed.
    #[error("Page discovery error: {0}")]
    Walk(#[from] ignore::Error),
}

impl SiteConfig {
    /// Load the configuration of the site at `root`.
    ///
    /// A missing `config.toml` yields defaults. CLI settings take precedence
    /// over file values and are applied before validation and page discovery.
    ///
    /// # Errors
    ///
    /// Returns error if `root` does not exist, the file cannot be parsed,
    /// expansion fails, a value is invalid or the page walk fails.
    pub fn load(root: &Path, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }

        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILENAME);
        let user = if config_path.is_file() {
            tracing::debug!(path = %config_path.display(), "loaded config");
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            tracing::debug!("no config file found");
            UserConfig::default()
        };

        let mut config = Self::resolve(root, config_path, user)?;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        config.pages = pages::discover_pages(&config.root, &config.out_dir, &config.src_exclude)?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(out_dir) = &settings.out_dir {
            self.out_dir.clone_from(out_dir);
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache.enabled = enabled;
        }
    }

    /// Resolve user configuration into site data and absolute paths.
    ///
    /// Pages are left empty and values are not validated yet.
    fn resolve(root: &Path, config_path: PathBuf, user: UserConfig) -> Result<Self, ConfigError> {
        let base = match user.base.as_deref() {
            Some(base) => normalize_base(&expand::expand_env(base, "base")?),
            None => "/".to_owned(),
        };
        let out_dir = match user.out_dir.as_deref() {
            Some(dir) => root.join(expand::expand_env(dir, "out_dir")?),
            None => root.join(DEFAULT_OUT_DIR),
        };
        let cache_dir = match user.cache.dir.as_deref() {
            Some(dir) => Some(root.join(expand::expand_env(dir, "cache.dir")?)),
            None => None,
        };

        let site = SiteData {
            lang: non_empty(user.lang.as_deref()).unwrap_or(DEFAULT_LANG).to_owned(),
            title: non_empty(user.title.as_deref()).unwrap_or(DEFAULT_TITLE).to_owned(),
            description: non_empty(user.description.as_deref())
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_owned(),
            base,
            head: user.head,
            theme_config: user.theme_config,
            locales: user.locales,
            custom_data: user.custom_data,
            langs: BTreeMap::new(),
        };

        let theme_dir = root.join(CONFIG_DIR).join("theme");
        Ok(Self {
            root: root.to_path_buf(),
            site,
            config_path,
            theme_dir: theme_dir.is_dir().then_some(theme_dir),
            out_dir,
            pages: Vec::new(),
            markdown: user.markdown,
            cache: CacheConfig {
                enabled: user.cache.enabled.unwrap_or(true),
                capacity: user.cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
                dir: cache_dir,
            },
            src_exclude: user.src_exclude,
        })
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails, or
    /// `ConfigError::Io` if a path cannot be made absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "cache.capacity must be greater than 0".to_owned(),
            ));
        }
        if !self.site.base.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "base must start with /, got {:?}",
                self.site.base
            )));
        }
        if let Some(dir) = &self.cache.dir {
            self.validate_cache_dir(dir)?;
        }
        Ok(())
    }

    /// The cache directory is wiped on version changes, so it must not
    /// contain the site sources or the build output.
    fn validate_cache_dir(&self, dir: &Path) -> Result<(), ConfigError> {
        let dir = absolute_normalized(dir)?;
        for (name, path) in [("site root", &self.root), ("output directory", &self.out_dir)] {
            if absolute_normalized(path)?.starts_with(&dir) {
                return Err(ConfigError::Validation(format!(
                    "cache.dir {} must not be the {name} or one of its parents",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn absolute_normalized(path: &Path) -> Result<PathBuf, ConfigError> {
    let mut normalized = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
