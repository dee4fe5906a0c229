//! Site-wide data shared by every page.
//!
//! [`SiteData`] is serialized with the camelCase keys the page runtime reads.
//! Locale tables may override parts of it for routes below their root; see
//! [`SiteData::resolve_by_route`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub(crate) const DEFAULT_LANG: &str = "en-US";
pub(crate) const DEFAULT_TITLE: &str = "Quire";
pub(crate) const DEFAULT_DESCRIPTION: &str = "A Quire site";

/// One element injected into the document head.
///
/// Written as `[tag, {attrs}]` or `[tag, {attrs}, innerHTML]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeadConfig {
    WithContent(String, Map<String, Value>, String),
    Tag(String, Map<String, Value>),
}

/// Overrides applied to routes below a locale root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct LocaleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Vec<HeadConfig>>,
    /// Name shown in a language switcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Theme keys merged over the site theme configuration.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub theme_config: Map<String, Value>,
}

/// Entry of the language dictionary exposed on resolved site data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangInfo {
    pub lang: String,
    pub label: String,
}

/// Site metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub lang: String,
    pub title: String,
    pub description: String,
    /// Public base path, always ending with `/`.
    pub base: String,
    pub head: Vec<HeadConfig>,
    pub theme_config: Map<String, Value>,
    /// Locale root (for example `/zh/`) to overrides.
    pub locales: BTreeMap<String, LocaleConfig>,
    pub custom_data: Map<String, Value>,
    /// Locale root to language, filled in by [`resolve_by_route`](Self::resolve_by_route).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub langs: BTreeMap<String, LangInfo>,
}

impl Default for SiteData {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_owned(),
            title: DEFAULT_TITLE.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            base: "/".to_owned(),
            head: Vec::new(),
            theme_config: Map::new(),
            locales: BTreeMap::new(),
            custom_data: Map::new(),
            langs: BTreeMap::new(),
        }
    }
}

impl SiteData {
    /// Site data as seen from `route`.
    ///
    /// `route` may include the site base. The longest locale root other than
    /// `/` that prefixes the route overlays its language, title, description
    /// and head, and its theme keys are merged over the site ones. The result
    /// carries no locales but a `langs` dictionary of every locale.
    #[must_use]
    pub fn resolve_by_route(&self, route: &str) -> SiteData {
        if self.locales.is_empty() {
            return self.clone();
        }

        let route = self.strip_base(route);
        let mut resolved = self.clone();
        resolved.locales = BTreeMap::new();
        resolved.langs = self.lang_dictionary();

        let matched = self
            .locales
            .iter()
            .filter(|(root, _)| root.as_str() != "/" && route.starts_with(root.as_str()))
            .max_by_key(|(root, _)| root.len());

        if let Some((root, locale)) = matched {
            tracing::debug!(route = %route, locale = %root, "resolved locale");
            if let Some(lang) = non_empty(locale.lang.as_deref()) {
                lang.clone_into(&mut resolved.lang);
            }
            if let Some(title) = non_empty(locale.title.as_deref()) {
                title.clone_into(&mut resolved.title);
            }
            if let Some(description) = non_empty(locale.description.as_deref()) {
                description.clone_into(&mut resolved.description);
            }
            if let Some(head) = &locale.head {
                resolved.head.clone_from(head);
            }
            for (key, value) in &locale.theme_config {
                resolved.theme_config.insert(key.clone(), value.clone());
            }
        }

        resolved
    }

    /// Route with the site base replaced by `/`.
    fn strip_base<'a>(&self, route: &'a str) -> std::borrow::Cow<'a, str> {
        match route.strip_prefix(self.base.as_str()) {
            Some(rest) if self.base != "/" => format!("/{rest}").into(),
            _ => route.into(),
        }
    }

    fn lang_dictionary(&self) -> BTreeMap<String, LangInfo> {
        self.locales
            .iter()
            .map(|(root, locale)| {
                let lang = non_empty(locale.lang.as_deref()).unwrap_or(self.lang.as_str());
                let label = non_empty(locale.label.as_deref()).unwrap_or(lang);
                (
                    root.clone(),
                    LangInfo {
                        lang: lang.to_owned(),
                        label: label.to_owned(),
                    },
                )
            })
            .collect()
    }
}

/// Normalize a configured base path to end with `/`.
pub(crate) fn normalize_base(base: &str) -> String {
    if base.is_empty() {
        "/".to_owned()
    } else if base.ends_with('/') {
        base.to_owned()
    } else {
        format!("{base}/")
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
