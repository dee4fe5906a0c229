//! HTML fragments emitted by the renderer.
//!
//! Output targets a component template: code blocks carry `v-pre` so that
//! `{{ }}` inside code is not evaluated, and GFM alerts become
//! `custom-block` containers.

use std::fmt::Write;

use pulldown_cmark::BlockQuoteKind;

use crate::state::escape_html;

/// GitHub-style alert kind (`> [!NOTE]` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    fn class(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre v-pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre v-pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
}

pub(crate) fn alert_start(kind: AlertKind, out: &mut String) {
    let class = kind.class();
    write!(
        out,
        r#"<div class="custom-block {class}"><p class="custom-block-title">{}</p>"#,
        class.to_ascii_uppercase()
    )
    .unwrap();
}

pub(crate) fn alert_end(out: &mut String) {
    out.push_str("</div>");
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

pub(crate) fn heading_anchor(id: &str, out: &mut String) {
    write!(
        out,
        r##"<a class="header-anchor" href="#{}">#</a> "##,
        escape_html(id)
    )
    .unwrap();
}

/// Build the opening `<a>` tag for a link destination.
///
/// External destinations optionally open in a new tab. Relative links to
/// `.md` documents point at the compiled `.html` page instead.
pub(crate) fn link_open(url: &str, new_tab: bool) -> String {
    if is_external(url) {
        let target = if new_tab {
            r#" target="_blank" rel="noopener noreferrer""#
        } else {
            ""
        };
        return format!(r#"<a href="{}"{target}>"#, escape_html(url));
    }
    format!(r#"<a href="{}">"#, escape_html(&rewrite_markdown_link(url)))
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

/// Rewrite `page.md` and `page.md#frag` to `page.html` and `page.html#frag`.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn rewrite_markdown_link(url: &str) -> String {
    if url.starts_with("mailto:") || url.starts_with("tel:") || url.starts_with('#') {
        return url.to_owned();
    }

    let (path, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };
    match path.strip_suffix(".md") {
        Some(stem) => format!("{stem}.html{fragment}"),
        None => url.to_owned(),
    }
}
