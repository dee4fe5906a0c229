//! Plain-text resolution of heading and title strings.
//!
//! Titles come from free-form metadata or heading lines and may carry inline
//! markdown or HTML. [`deeply_parse_header`] reduces them to text usable in a
//! `<title>` element or a navigation label.

use std::sync::LazyLock;

use regex::Regex;

/// HTML tags not preceded by a backtick or escape.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^><`\\])<.*>([^><`]|$)").unwrap());

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Wrapping markers, longest first so `***x***` is not read as `*` pairs.
static INLINE_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"`", r"\*\*\*", r"\*\*", r"\*", r"_", r"~~"]
        .iter()
        .map(|marker| Regex::new(&format!(r"{marker}(.*?[^\\]){marker}")).unwrap())
        .collect()
});

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\([*_`!<$])").unwrap());

/// Strip markup from a heading or title string.
///
/// Applied in order: HTML tags outside code are removed, the entities
/// `&amp; &lt; &gt; &quot; &#39;` are decoded, links keep their text, the
/// inline markers `` ` ``, `***`, `**`, `*`, `_` and `~~` are unwrapped,
/// backslash escapes are dropped, and the result is trimmed.
///
/// ```
/// use quire_page::deeply_parse_header;
///
/// assert_eq!(deeply_parse_header("Hello `code`"), "Hello code");
/// assert_eq!(deeply_parse_header("**Bold** [link](/a) <Badge />"), "Bold link");
/// ```
#[must_use]
pub fn deeply_parse_header(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, "${1}${2}");
    let text = unescape_html(&text);
    let mut text = LINK.replace_all(&text, "${1}").into_owned();
    for marker in INLINE_MARKERS.iter() {
        text = marker.replace_all(&text, "${1}").into_owned();
    }
    ESCAPE.replace_all(&text, "${1}").trim().to_owned()
}

fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
