//! Assembly of the page component source.
//!
//! The source consists of exactly three segments, in this order:
//!
//! ```text
//! <script>{script fragments}</script><style>{style fragments}</style>
//! <template><div>{markup}</div></template>
//! ```
//!
//! The script segment ends with a default export registering components and
//! a `__pageData` constant holding the page data as a JSON string literal
//! whose value is itself JSON.

use quire_renderer::{DeclarationKind, HoistedDeclarations};

use crate::page_data::PageData;

/// Tokens a bundler substitutes at build time, with their defused forms.
const INTERPOLATED_TOKENS: [(&str, &str); 2] = [
    ("import.meta", "import.<wbr/>meta"),
    ("process.env", "process.<wbr/>env"),
];

/// Break up bundler-substituted tokens in rendered markup.
///
/// `<wbr/>` renders as nothing, so the visible text is unchanged.
#[must_use]
pub fn sanitize(markup: &str) -> String {
    INTERPOLATED_TOKENS
        .iter()
        .fold(markup.to_owned(), |acc, (token, defused)| {
            acc.replace(token, defused)
        })
}

/// Append the default export registering `hoisted.components`.
pub(crate) fn inject_components(hoisted: &mut HoistedDeclarations) {
    let export = format!(
        "\nexport default {{\n    components: {{\n      {}\n    }},\n  }}\n  ",
        hoisted.get(DeclarationKind::Components).join(", ")
    );
    hoisted.push(DeclarationKind::Script, export);
}

/// Append the `__pageData` export.
///
/// The page data is encoded to JSON, and that text is encoded again as a JSON
/// string literal, so one parse of the literal's value restores the data.
/// Every `</` in the literal is written as `<\/`, which decodes to the same
/// string but cannot close the surrounding `<script>` element.
pub(crate) fn inject_page_data(
    hoisted: &mut HoistedDeclarations,
    data: &PageData,
) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string(data)?;
    let literal = serde_json::to_string(&json)?.replace("</", "<\\/");
    hoisted.push(
        DeclarationKind::Script,
        format!("\nexport const __pageData = {literal}"),
    );
    Ok(())
}

/// Concatenate the script, style and template segments.
pub(crate) fn assemble(hoisted: &HoistedDeclarations, markup: &str) -> String {
    format!(
        "<script>{}</script><style>{}</style>\n<template><div>{markup}</div></template>",
        hoisted.get(DeclarationKind::Script).join("\n"),
        hoisted.get(DeclarationKind::Style).join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_renderer::HeadingEntry;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sanitize_import_meta() {
        assert_eq!(
            sanitize("<code>import.meta.env.BASE_URL</code>"),
            "<code>import.<wbr/>meta.env.BASE_URL</code>"
        );
    }

    #[test]
    fn test_sanitize_process_env() {
        assert_eq!(
            sanitize("process.env.NODE_ENV and process.env.HOME"),
            "process.<wbr/>env.NODE_ENV and process.<wbr/>env.HOME"
        );
    }

    #[test]
    fn test_sanitize_leaves_similar_text() {
        assert_eq!(sanitize("import meta, process_env, importXmeta"), "import meta, process_env, importXmeta");
    }

    #[test]
    fn test_inject_components() {
        let mut hoisted = HoistedDeclarations::new();
        hoisted.push(DeclarationKind::Components, "Badge");
        hoisted.push(DeclarationKind::Components, "Demo");
        inject_components(&mut hoisted);

        assert_eq!(
            hoisted.get(DeclarationKind::Script),
            ["\nexport default {\n    components: {\n      Badge, Demo\n    },\n  }\n  "]
        );
    }

    #[test]
    fn test_inject_components_empty() {
        let mut hoisted = HoistedDeclarations::new();
        inject_components(&mut hoisted);

        assert_eq!(
            hoisted.get(DeclarationKind::Script),
            ["\nexport default {\n    components: {\n      \n    },\n  }\n  "]
        );
    }

    #[test]
    fn test_page_data_double_encoded() {
        let mut frontmatter = serde_json::Map::new();
        frontmatter.insert("tags".to_owned(), json!(["ünïcödé", {"nested": [1, 2.5]}]));
        let data = PageData {
            title: "Grüße \"quoted\"".to_owned(),
            description: "line\nbreak".to_owned(),
            frontmatter,
            headers: vec![HeadingEntry {
                level: 2,
                text: "日本語".to_owned(),
                anchor_id: "日本語".to_owned(),
            }],
            relative_path: "guide/intro.md".to_owned(),
            last_updated: 1_700_000_000_123,
        };

        let mut hoisted = HoistedDeclarations::new();
        inject_page_data(&mut hoisted, &data).unwrap();

        let script = &hoisted.get(DeclarationKind::Script)[0];
        let literal = script
            .strip_prefix("\nexport const __pageData = ")
            .unwrap();
        let inner: String = serde_json::from_str(literal).unwrap();
        let parsed: PageData = serde_json::from_str(&inner).unwrap();
        assert_eq!(parsed, data);

        let value: serde_json::Value = serde_json::from_str(&inner).unwrap();
        assert_eq!(value["relativePath"], "guide/intro.md");
        assert_eq!(value["lastUpdated"], 1_700_000_000_123_i64);
        assert_eq!(value["headers"][0]["anchorId"], "日本語");
    }

    #[test]
    fn test_page_data_cannot_close_script() {
        let mut frontmatter = serde_json::Map::new();
        frontmatter.insert("title".to_owned(), json!("Using </script> tags"));
        let data = PageData {
            title: "Using </script> tags".to_owned(),
            frontmatter,
            ..PageData::default()
        };

        let mut hoisted = HoistedDeclarations::new();
        inject_page_data(&mut hoisted, &data).unwrap();
        let source = assemble(&hoisted, "");

        let script_end = source.find("</script>").unwrap();
        assert!(source[script_end..].starts_with("</script><style>"));

        let literal = hoisted.get(DeclarationKind::Script)[0]
            .strip_prefix("\nexport const __pageData = ")
            .unwrap();
        assert!(literal.contains(r"<\/script>"));
        let inner: String = serde_json::from_str(literal).unwrap();
        let parsed: PageData = serde_json::from_str(&inner).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_assemble_segment_order() {
        let mut hoisted = HoistedDeclarations::new();
        hoisted.push(DeclarationKind::Script, "const a = 1");
        hoisted.push(DeclarationKind::Script, "const b = 2");
        hoisted.push(DeclarationKind::Style, ".a {}");
        hoisted.push(DeclarationKind::Style, ".b {}");

        assert_eq!(
            assemble(&hoisted, "<p>hi</p>"),
            "<script>const a = 1\nconst b = 2</script><style>.a {}\n.b {}</style>\n<template><div><p>hi</p></div></template>"
        );
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(
            assemble(&HoistedDeclarations::new(), ""),
            "<script></script><style></style>\n<template><div></div></template>"
        );
    }
}
