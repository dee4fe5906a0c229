//! Colored terminal output on stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Build progress and error reporting.
///
/// Everything goes to stderr so that `quire compile` can stream the compiled
/// page on stdout.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print a `label: path` line.
    pub(crate) fn location(&self, label: &str, path: &Path) {
        self.line(&format!("{} {}", self.dim.apply_to(format!("{label}:")), path.display()));
    }

    /// Report a page that failed to build.
    pub(crate) fn page_failed(&self, page: &str, error: &impl Display) {
        self.line(&format!("{} {page}: {error}", self.yellow.apply_to("failed")));
    }

    /// Report a finished build.
    pub(crate) fn built(&self, pages: usize, out_dir: &Path) {
        let noun = if pages == 1 { "page" } else { "pages" };
        self.line(
            &self
                .green
                .apply_to(format!("Built {pages} {noun} to {}", out_dir.display()))
                .to_string(),
        );
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red.apply_to(msg).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
