use std::path::PathBuf;

/// Expand one glob pattern (spec §4.5).
///
/// - `*` matches within a single directory entry; `**` matches
///   recursively (both handled by the `glob` crate).
/// - A pattern with no `*` is passed through verbatim, with no existence
///   check at expansion time.
/// - A pattern anchored in a non-existent directory yields the empty set.
pub fn expand_glob(pattern: &str) -> Vec<PathBuf> {
    if !pattern.contains('*') {
        return vec![PathBuf::from(pattern)];
    }
    match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(_) => Vec::new(),
    }
}
