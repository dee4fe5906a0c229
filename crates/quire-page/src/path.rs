//! Portable relative paths.

/// Path of `file` relative to the directory `root`, with `/` separators.
///
/// Both inputs may use `/` or `\` separators. The computation is lexical: `.`
/// segments are dropped, `..` segments pop their parent, and no file-system
/// access takes place. Relative inputs are therefore only comparable with each
/// other: a leading `..` cannot be resolved against the working directory and
/// is kept as a segment. Pass absolute paths when `root` may lie above the
/// working directory.
///
/// # Examples
///
/// ```
/// use quire_page::relative_path;
///
/// assert_eq!(relative_path("/site", "/site/guide/intro.md"), "guide/intro.md");
/// assert_eq!(relative_path(r"C:\site", r"C:\site\guide\intro.md"), "guide/intro.md");
/// assert_eq!(relative_path("/site/docs", "/site/README.md"), "../README.md");
/// ```
#[must_use]
pub fn relative_path(root: &str, file: &str) -> String {
    let root_segs = normalize(root);
    let file_segs = normalize(file);

    let common = root_segs
        .iter()
        .zip(&file_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments = vec![".."; root_segs.len() - common];
    segments.extend_from_slice(&file_segs[common..]);
    segments.join("/")
}

/// Split a path on either separator, resolving `.` and `..` lexically.
fn normalize(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }
    segments
}
