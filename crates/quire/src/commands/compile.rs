//! `quire compile` command implementation.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use quire_config::SiteConfig;
use quire_page::{CompiledArtifact, RawDocument};

use super::site_compiler;
use crate::error::CliError;

/// Arguments for the compile command.
#[derive(Args)]
pub(crate) struct CompileArgs {
    /// Markdown file to compile.
    file: PathBuf,

    /// Site root the file belongs to.
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Print the page data as JSON instead of the component source.
    #[arg(long)]
    page_data: bool,
}

impl CompileArgs {
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let config = SiteConfig::load(&self.root, None)?;
        let compiler = site_compiler(&config, version);

        let text = fs::read_to_string(&self.file)?;
        let source = self.file.to_string_lossy();
        let artifact = compiler.compile(&RawDocument::new(&text, &source))?;

        let mut stdout = io::stdout().lock();
        stdout.write_all(render_output(&artifact, self.page_data)?.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Text printed for `artifact`, newline terminated.
fn render_output(artifact: &CompiledArtifact, page_data: bool) -> Result<String, CliError> {
    let mut text = if page_data {
        serde_json::to_string_pretty(&artifact.page_data)?
    } else {
        artifact.renderable_source.clone()
    };
    text.push('\n');
    Ok(text)
}
