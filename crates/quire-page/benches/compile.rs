//! Benchmarks for page compilation.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::io;
use std::path::Path;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quire_cache::{LruCache, NullCache};
use quire_page::{CompiledArtifact, LastModified, MarkdownCompiler, RawDocument};
use quire_renderer::HtmlRenderer;

struct Epoch;

impl LastModified for Epoch {
    fn last_modified(&self, _path: &Path) -> io::Result<i64> {
        Ok(0)
    }
}

/// Generate a document with front matter and the given structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("---\ntitle: Benchmark `document`\nhead:\n  - [meta, {name: description, content: bench}]\n---\n");
    md.push_str("# Document Title\n\n<script setup>\nconst n = 1\n</script>\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold**, *italic* and `code`.\n\n"
            ));
        }
        md.push_str("```js\nconsole.log(import.meta.env)\n```\n\n");
    }
    md
}

fn bench_compile_cold(c: &mut Criterion) {
    let compiler = MarkdownCompiler::new("/site", Arc::new(HtmlRenderer::default()), Arc::new(NullCache))
        .with_last_modified(Arc::new(Epoch));

    let mut group = c.benchmark_group("compile_cold");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &markdown,
            |b, text| b.iter(|| compiler.compile(&RawDocument::new(text, "/site/bench.md"))),
        );
    }

    group.finish();
}

fn bench_compile_warm(c: &mut Criterion) {
    let compiler = MarkdownCompiler::new(
        "/site",
        Arc::new(HtmlRenderer::default()),
        Arc::new(LruCache::<CompiledArtifact>::default()),
    )
    .with_last_modified(Arc::new(Epoch));

    let markdown = generate_markdown(20, 3);
    let document = RawDocument::new(&markdown, "/site/bench.md");
    let _ = compiler.compile(&document);

    c.bench_function("compile_warm_20h_3p", |b| {
        b.iter(|| compiler.compile(&document));
    });
}

criterion_group!(benches, bench_compile_cold, bench_compile_warm);
criterion_main!(benches);
