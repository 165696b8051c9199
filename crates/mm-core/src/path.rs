/// Rewrite `..` segments so a synthesized output/dep-file path can never
/// escape the build tree (spec §6, "Path sanitation"): every `../` becomes
/// `_/`, and a trailing `..` becomes `_`.
pub fn sanitize(path: &str) -> String {
    let mut out = path.replace("../", "_/");
    if out.ends_with("..") {
        out.truncate(out.len() - 2);
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_parent_segment() {
        assert_eq!(sanitize("../src/a.cpp"), "_/src/a.cpp");
    }

    #[test]
    fn rewrites_repeated_parent_segments() {
        assert_eq!(sanitize("../../a.cpp"), "_/_/a.cpp");
    }

    #[test]
    fn rewrites_trailing_double_dot() {
        assert_eq!(sanitize("build/.."), "build/_");
    }

    #[test]
    fn leaves_unrelated_paths_untouched() {
        assert_eq!(sanitize("src/a.cpp"), "src/a.cpp");
    }
}
