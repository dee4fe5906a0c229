//! Markdown page discovery.

use std::path::Path;

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::ConfigError;

/// Directories skipped at any depth.
const ALWAYS_EXCLUDED: &[&str] = &["node_modules"];

/// Find every markdown page below `root`.
///
/// Returns `/`-separated paths relative to `root`, sorted. Hidden entries,
/// `node_modules`, `out_dir` (when it lies below `root`) and anything matching
/// one of the gitignore-style `exclude` globs are skipped. Ignore files are
/// not consulted.
pub(crate) fn discover_pages(
    root: &Path,
    out_dir: &Path,
    exclude: &[String],
) -> Result<Vec<String>, ConfigError> {
    let mut overrides = OverrideBuilder::new(root);
    for name in ALWAYS_EXCLUDED {
        overrides.add(&format!("!{name}/"))?;
    }
    if let Ok(inside) = out_dir.strip_prefix(root)
        && !inside.as_os_str().is_empty()
    {
        overrides.add(&format!("!/{}/", to_slash(inside)))?;
    }
    for pattern in exclude {
        overrides.add(&format!("!{pattern}"))?;
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .overrides(overrides.build()?)
        .build();

    let mut pages = Vec::new();
    for entry in walker {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if !is_file || entry.path().extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            pages.push(to_slash(relative));
        }
    }
    pages.sort();

    tracing::debug!(count = pages.len(), root = %root.display(), "discovered pages");
    Ok(pages)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
