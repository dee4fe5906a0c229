//! Hoisted declarations.
//!
//! Some fragments of a document cannot stay inline in the page template:
//! top-level `<script>` and `<style>` HTML blocks are lifted out of the markup,
//! and custom components referenced from raw HTML must be registered with the
//! page. [`HoistedDeclarations`] collects them in document order.

/// Kind of a hoisted declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Script fragment, emitted inside the page's script segment.
    Script,
    /// Style fragment, emitted inside the page's style segment.
    Style,
    /// Component name to register with the page.
    Components,
}

impl DeclarationKind {
    /// Tag name that opens a hoistable HTML block of this kind.
    fn tag(self) -> Option<&'static str> {
        match self {
            Self::Script => Some("script"),
            Self::Style => Some("style"),
            Self::Components => None,
        }
    }
}

/// Ordered fragments per declaration kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoistedDeclarations {
    /// Script fragments.
    pub script: Vec<String>,
    /// Style fragments.
    pub style: Vec<String>,
    /// Component names, deduplicated, in order of first reference.
    pub components: Vec<String>,
}

impl HoistedDeclarations {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment of the given kind.
    ///
    /// Component names already present are ignored.
    pub fn push(&mut self, kind: DeclarationKind, fragment: impl Into<String>) {
        let fragment = fragment.into();
        match kind {
            DeclarationKind::Script => self.script.push(fragment),
            DeclarationKind::Style => self.style.push(fragment),
            DeclarationKind::Components => {
                if !self.components.contains(&fragment) {
                    self.components.push(fragment);
                }
            }
        }
    }

    /// Fragments of the given kind.
    pub fn get(&self, kind: DeclarationKind) -> &[String] {
        match kind {
            DeclarationKind::Script => &self.script,
            DeclarationKind::Style => &self.style,
            DeclarationKind::Components => &self.components,
        }
    }

    /// Whether no fragment of any kind was collected.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty() && self.style.is_empty() && self.components.is_empty()
    }
}

/// Classify an HTML block as a hoistable `<script>` or `<style>` element.
///
/// The block must start (after leading whitespace) with the opening tag,
/// matched case-insensitively and followed by whitespace, `>` or the end of
/// the block.
pub(crate) fn hoistable_kind(block: &str) -> Option<DeclarationKind> {
    let trimmed = block.trim_start();
    [DeclarationKind::Script, DeclarationKind::Style]
        .into_iter()
        .find(|kind| kind.tag().is_some_and(|tag| opens_with_tag(trimmed, tag)))
}

fn opens_with_tag(html: &str, tag: &str) -> bool {
    let Some(rest) = html.strip_prefix('<') else {
        return false;
    };
    let Some(name) = rest.get(..tag.len()) else {
        return false;
    };
    if !name.eq_ignore_ascii_case(tag) {
        return false;
    }
    rest[tag.len()..]
        .chars()
        .next()
        .is_none_or(|c| c == '>' || c.is_whitespace())
}

/// Text between the opening tag and the last closing tag of an element.
///
/// Without a closing tag, everything after the opening tag is returned.
pub(crate) fn inner_content(block: &str, kind: DeclarationKind) -> String {
    let Some(tag) = kind.tag() else {
        return block.to_owned();
    };
    let trimmed = block.trim();
    let start = trimmed.find('>').map_or(trimmed.len(), |i| i + 1);
    let lower = trimmed.to_ascii_lowercase();
    let end = lower
        .rfind(&format!("</{tag}"))
        .filter(|&end| end >= start)
        .unwrap_or(trimmed.len());
    trimmed[start..end].trim_matches('\n').to_owned()
}

/// Names of PascalCase elements opened in a fragment of raw HTML.
///
/// `<MyWidget prop="x" />` yields `MyWidget`; lowercase HTML elements and
/// closing tags are ignored.
pub(crate) fn component_names(html: &str) -> impl Iterator<Item = &str> {
    html.match_indices('<').filter_map(move |(pos, _)| {
        let rest = &html[pos + 1..];
        if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
            return None;
        }
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        Some(&rest[..len])
    })
}
