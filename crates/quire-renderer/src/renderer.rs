//! Event-driven markdown renderer.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::code_block::{CodeBlockProcessor, ProcessResult, parse_fence_info};
use crate::error::MarkupError;
use crate::hoist::{DeclarationKind, HoistedDeclarations, component_names, hoistable_kind, inner_content};
use crate::html::{self, AlertKind};
use crate::markup::{RenderedMarkup, RendererOptions};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, escape_html};

/// Single-use renderer walking the pulldown-cmark event stream.
///
/// Shared elements (tables, lists, inline formatting) are written directly;
/// code blocks, alerts, images and links go through [`html`].
pub(crate) struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    hoisted: HoistedDeclarations,
    /// Raw HTML of the HTML block being read, if any.
    html_block: Option<String>,
    pending_image: Option<(String, String)>,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    code_block_index: usize,
    pending_attrs: HashMap<String, String>,
    /// Stack of alert kinds for nested blockquotes (regular blockquote uses None).
    alert_stack: Vec<Option<AlertKind>>,
    failure: Option<MarkupError>,
    gfm: bool,
    header_anchors: bool,
    new_tab: bool,
    register_components: bool,
}

impl MarkdownRenderer {
    pub(crate) fn new(
        options: &RendererOptions,
        processors: Vec<Box<dyn CodeBlockProcessor>>,
    ) -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(&options.header_levels),
            hoisted: HoistedDeclarations::new(),
            html_block: None,
            pending_image: None,
            processors,
            code_block_index: 0,
            pending_attrs: HashMap::new(),
            alert_stack: Vec::new(),
            failure: None,
            gfm: options.gfm,
            header_anchors: options.header_anchors,
            new_tab: options.external_links_new_tab,
            register_components: options.register_components,
        }
    }

    fn parser_options(&self) -> Options {
        let base = Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            base
        }
    }

    /// Render a document body.
    ///
    /// Calls `post_process` on all processors to resolve placeholders. The
    /// first processor error aborts the render.
    pub(crate) fn render(mut self, markdown: &str) -> Result<RenderedMarkup, MarkupError> {
        let parser = Parser::new_ext(markdown, self.parser_options());
        for event in parser {
            self.process_event(event);
            if let Some(error) = self.failure.take() {
                return Err(error);
            }
        }

        let mut markup = std::mem::take(&mut self.output);
        for processor in &mut self.processors {
            processor.post_process(&mut markup);
        }

        Ok(RenderedMarkup {
            markup,
            headers: self.heading.take_headers(),
            hoisted: self.hoisted,
            warnings: self
                .processors
                .iter()
                .flat_map(|p| p.warnings())
                .cloned()
                .collect(),
        })
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.block_html(&html),
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input type="checkbox" checked disabled>"#
                } else {
                    r#"<input type="checkbox" disabled>"#
                });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, id, .. } => {
                // Opening tag is written in end_tag once the ID is known.
                self.heading
                    .start_heading(level as u8, id.map(|id| id.to_string()));
            }
            Tag::BlockQuote(kind) => match kind.filter(|_| self.gfm) {
                Some(kind) => {
                    let alert = AlertKind::from(kind);
                    self.alert_stack.push(Some(alert));
                    html::alert_start(alert, &mut self.output);
                }
                None => {
                    self.alert_stack.push(None);
                    self.output.push_str("<blockquote>");
                }
            },
            Tag::CodeBlock(kind) => {
                let (lang, attrs) = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let (lang, attrs) = parse_fence_info(info);
                        (if lang.is_empty() { None } else { Some(lang) }, attrs)
                    }
                    _ => (None, HashMap::new()),
                };
                self.pending_attrs = attrs;
                self.code.start(lang);
            }
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                let open = html::link_open(&dest_url, self.new_tab);
                self.push_inline(&open);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => self.end_heading(),
            TagEnd::BlockQuote(_) => match self.alert_stack.pop() {
                Some(Some(_)) => html::alert_end(&mut self.output),
                _ => self.output.push_str("</blockquote>"),
            },
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::HtmlBlock => self.end_html_block(),
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut img = String::new();
                    html::image(&src, &alt, &title, &mut img);
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn end_heading(&mut self) {
        let Some(heading) = self.heading.complete_heading() else {
            return;
        };
        let level = heading.level;
        write!(self.output, r#"<h{level} id="{}">"#, escape_html(&heading.id)).unwrap();
        if self.header_anchors {
            html::heading_anchor(&heading.id, &mut self.output);
        }
        write!(self.output, "{}</h{level}>", heading.html).unwrap();
    }

    fn end_code_block(&mut self) {
        let (lang, content) = self.code.end();
        let attrs = std::mem::take(&mut self.pending_attrs);
        let index = self.code_block_index;
        self.code_block_index += 1;

        if let Some(lang) = lang.as_deref() {
            for processor in &mut self.processors {
                match processor.process(lang, &attrs, &content, index) {
                    ProcessResult::Placeholder(markup) | ProcessResult::Inline(markup) => {
                        self.output.push_str(&markup);
                        return;
                    }
                    ProcessResult::Error(message) => {
                        self.failure = Some(MarkupError::Processor {
                            language: lang.to_owned(),
                            message,
                        });
                        return;
                    }
                    ProcessResult::PassThrough => {}
                }
            }
        }

        html::code_block(lang.as_deref(), &content, &mut self.output);
    }

    fn block_html(&mut self, html: &str) {
        match self.html_block.as_mut() {
            Some(block) => block.push_str(html),
            None => self.inline_html(html),
        }
    }

    /// Hoist `<script>`/`<style>` blocks, pass any other block through.
    fn end_html_block(&mut self) {
        let Some(block) = self.html_block.take() else {
            return;
        };
        if let Some(kind) = hoistable_kind(&block) {
            self.hoisted.push(kind, inner_content(&block, kind));
            return;
        }
        self.register_components_in(&block);
        self.output.push_str(&block);
    }

    fn inline_html(&mut self, html: &str) {
        self.register_components_in(html);
        self.push_inline(html);
    }

    fn register_components_in(&mut self, html: &str) {
        if !self.register_components {
            return;
        }
        for name in component_names(html) {
            self.hoisted.push(DeclarationKind::Components, name);
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code v-pre>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::HeadingEntry;

    fn render_with(markdown: &str, options: &RendererOptions) -> RenderedMarkup {
        MarkdownRenderer::new(options, Vec::new())
            .render(markdown)
            .unwrap()
    }

    fn render_html(markdown: &str) -> RenderedMarkup {
        let options = RendererOptions {
            header_anchors: false,
            ..RendererOptions::default()
        };
        render_with(markdown, &options)
    }

    fn render_processed(markdown: &str, processor: impl CodeBlockProcessor + 'static) -> RenderedMarkup {
        MarkdownRenderer::new(&RendererOptions::default(), vec![Box::new(processor)])
            .render(markdown)
            .unwrap()
    }

    #[test]
    fn test_html_basic_paragraph() {
        let result = render_html("Hello, world!");
        assert_eq!(result.markup, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_html_heading_with_id() {
        let result = render_html("## Section Title");
        assert_eq!(result.markup, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(
            result.headers,
            vec![HeadingEntry {
                level: 2,
                text: "Section Title".to_owned(),
                anchor_id: "section-title".to_owned(),
            }]
        );
    }

    #[test]
    fn test_heading_anchor_prepended() {
        let result = render_with("## Usage", &RendererOptions::default());
        assert_eq!(
            result.markup,
            r##"<h2 id="usage"><a class="header-anchor" href="#usage">#</a> Usage</h2>"##
        );
    }

    #[test]
    fn test_heading_explicit_id() {
        let result = render_html("## Getting started {#start}");
        assert!(result.markup.contains(r#"<h2 id="start">"#));
        assert_eq!(result.headers[0].anchor_id, "start");
        assert_eq!(result.headers[0].text, "Getting started");
    }

    #[test]
    fn test_outline_respects_levels() {
        let result = render_html("# Title\n\n## Intro\n\n### Detail\n\n#### Deep");
        let levels: Vec<u8> = result.headers.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![2, 3]);
        assert!(result.markup.contains(r#"<h1 id="title">Title</h1>"#));
        assert!(result.markup.contains(r#"<h4 id="deep">Deep</h4>"#));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render_html("## FAQ\n\n## FAQ\n\n## FAQ");
        let ids: Vec<_> = result.headers.iter().map(|h| h.anchor_id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render_html("## Install `npm`");
        assert!(result.markup.contains("<code v-pre>npm</code>"));
        assert_eq!(result.headers[0].text, "Install npm");
    }

    #[test]
    fn test_code_block_is_v_pre() {
        let result = render_html("```vue\n<p>{{ msg }}</p>\n```");
        assert_eq!(
            result.markup,
            "<pre v-pre><code class=\"language-vue\">&lt;p&gt;{{ msg }}&lt;/p&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_script_block_hoisted() {
        let result = render_html("# Page\n\n<script setup>\nconst a = 1\n</script>\n\nText");
        assert_eq!(result.hoisted.script, vec!["const a = 1".to_owned()]);
        assert!(!result.markup.contains("script"));
        assert!(result.markup.contains("<p>Text</p>"));
    }

    #[test]
    fn test_style_blocks_hoisted_in_order() {
        let result = render_html("<style>\n.a {}\n</style>\n\nx\n\n<style scoped>\n.b {}\n</style>\n");
        assert_eq!(result.hoisted.style, vec![".a {}".to_owned(), ".b {}".to_owned()]);
        assert_eq!(result.markup, "<p>x</p>");
    }

    #[test]
    fn test_components_registered_from_html() {
        let result = render_html("<Badge text=\"beta\" />\n\nSee <Tooltip>hi</Tooltip> and <span>x</span>.");
        assert_eq!(result.hoisted.components, vec!["Badge", "Tooltip"]);
        assert!(result.markup.contains("<Badge text=\"beta\" />"));
    }

    #[test]
    fn test_components_not_registered_when_disabled() {
        let options = RendererOptions {
            register_components: false,
            ..RendererOptions::default()
        };
        let result = render_with("<Badge />", &options);
        assert!(result.hoisted.components.is_empty());
    }

    #[test]
    fn test_gfm_alert() {
        let result = render_html("> [!TIP]\n> Use **bold**.");
        assert_eq!(
            result.markup,
            r#"<div class="custom-block tip"><p class="custom-block-title">TIP</p><p>Use <strong>bold</strong>.</p></div>"#
        );
    }

    #[test]
    fn test_regular_blockquote() {
        let result = render_html("> Just a quote");
        assert_eq!(result.markup, "<blockquote><p>Just a quote</p></blockquote>");
    }

    #[test]
    fn test_links() {
        let result = render_html("[Guide](./guide.md) and [Site](https://example.com)");
        assert!(result.markup.contains(r#"<a href="./guide.html">Guide</a>"#));
        assert!(result.markup.contains(
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">Site</a>"#
        ));
    }

    #[test]
    fn test_html_image() {
        let result = render_html("![Alt text](image.png)");
        assert_eq!(result.markup, r#"<p><img src="image.png" alt="Alt text"></p>"#);
    }

    #[test]
    fn test_html_table() {
        let result = render_html("| A | B |\n|:--|---|\n| 1 | 2 |");
        assert_eq!(
            result.markup,
            r#"<table><thead><tr><th style="text-align:left">A</th><th>B</th></tr></thead><tbody><tr><td style="text-align:left">1</td><td>2</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_task_list() {
        let result = render_html("- [ ] Unchecked\n- [x] Checked");
        assert!(result.markup.contains(r#"<input type="checkbox" disabled>"#));
        assert!(result.markup.contains(r#"<input type="checkbox" checked disabled>"#));
    }

    #[test]
    fn test_gfm_disabled() {
        let options = RendererOptions {
            gfm: false,
            ..RendererOptions::default()
        };
        let result = render_with("| A | B |\n|---|---|\n| 1 | 2 |", &options);
        assert!(!result.markup.contains("<table>"));
    }

    #[test]
    fn test_ordered_list_start() {
        let result = render_html("3. Three\n4. Four");
        assert_eq!(result.markup, r#"<ol start="3"><li>Three</li><li>Four</li></ol>"#);
    }

    struct Diagrams {
        sources: Vec<String>,
    }

    impl CodeBlockProcessor for Diagrams {
        fn process(
            &mut self,
            language: &str,
            _attrs: &HashMap<String, String>,
            source: &str,
            index: usize,
        ) -> ProcessResult {
            match language {
                "diagram" => {
                    self.sources.push(source.to_owned());
                    ProcessResult::Placeholder(format!("{{{{DIAGRAM_{index}}}}}"))
                }
                "broken" => ProcessResult::Error("unsupported syntax".to_owned()),
                _ => ProcessResult::PassThrough,
            }
        }

        fn post_process(&mut self, markup: &mut String) {
            for (index, source) in self.sources.iter().enumerate() {
                *markup = markup.replace(
                    &format!("{{{{DIAGRAM_{index}}}}}"),
                    &format!("<figure>{}</figure>", source.trim()),
                );
            }
        }
    }

    #[test]
    fn test_processor_placeholder_resolved() {
        let result = render_processed(
            "```diagram\nA -> B\n```\n\n```rust\nfn main() {}\n```",
            Diagrams { sources: Vec::new() },
        );
        assert!(result.markup.starts_with("<figure>A -> B</figure>"));
        assert!(result.markup.contains(r#"class="language-rust""#));
    }

    #[test]
    fn test_processor_error_fails_render() {
        let error = MarkdownRenderer::new(
            &RendererOptions::default(),
            vec![Box::new(Diagrams { sources: Vec::new() })],
        )
        .render("```broken\nx\n```")
        .unwrap_err();

        assert!(matches!(
            error,
            MarkupError::Processor { ref language, ref message }
                if language == "broken" && message == "unsupported syntax"
        ));
    }

    struct Warner {
        warnings: Vec<String>,
    }

    impl CodeBlockProcessor for Warner {
        fn process(
            &mut self,
            language: &str,
            _attrs: &HashMap<String, String>,
            _source: &str,
            _index: usize,
        ) -> ProcessResult {
            self.warnings.push(format!("unknown language `{language}`"));
            ProcessResult::PassThrough
        }

        fn warnings(&self) -> &[String] {
            &self.warnings
        }
    }

    #[test]
    fn test_processor_warnings_collected() {
        let result = render_processed("```foo\nx\n```", Warner { warnings: Vec::new() });
        assert_eq!(result.warnings, vec!["unknown language `foo`".to_owned()]);
        assert!(result.markup.contains(r#"class="language-foo""#));
    }

    #[test]
    fn test_no_warnings_by_default() {
        let result = render_html("Hello");
        assert!(result.warnings.is_empty());
    }
}
