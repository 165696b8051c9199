use std::path::PathBuf;

/// Parsed contents of a GCC-style `.d` file plus the engine's own
/// tab-indented command-tracking line (spec §6, "Dep-file format").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepFile {
    pub headers: Vec<PathBuf>,
    pub previous_command: Option<String>,
}

/// Parse a dep-file. Missing/unparsable input is represented the same way
/// the caller would represent "no dep-file": an empty [`DepFile`].
pub fn parse_dep_file(contents: &str) -> DepFile {
    let joined = contents.replace("\\\r\n", " ").replace("\\\n", " ");
    let mut headers = Vec::new();
    let mut previous_command = None;

    let mut lines = joined.lines();
    if let Some(first) = lines.next() {
        if let Some(idx) = first.find(':') {
            headers.extend(
                first[idx + 1..]
                    .split_whitespace()
                    .filter(|s| *s != "\\")
                    .map(PathBuf::from),
            );
        }
    }

    for line in lines {
        if let Some(cmd) = line.strip_prefix('\t') {
            previous_command = Some(cmd.to_string());
        } else if !line.trim().is_empty() {
            headers.extend(
                line.split_whitespace()
                    .filter(|s| *s != "\\")
                    .map(PathBuf::from),
            );
        }
    }

    DepFile {
        headers,
        previous_command,
    }
}

/// Synthesize the dep-file a link rule writes for itself (spec §4.6 step
/// 5): `OL: input1 input2 ...\n\t<command>\n`.
pub fn render_link_dep_file(output: &str, inputs: &[String], command: &str) -> String {
    format!("{output}: {}\n\t{command}\n", inputs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_dep_line() {
        let d = parse_dep_file("a.o: a.cpp a.h\n");
        assert_eq!(d.headers, vec![PathBuf::from("a.cpp"), PathBuf::from("a.h")]);
        assert_eq!(d.previous_command, None);
    }

    #[test]
    fn parses_backslash_continuation() {
        let d = parse_dep_file("a.o: a.cpp \\\n  a.h \\\n  b.h\n");
        assert_eq!(
            d.headers,
            vec![PathBuf::from("a.cpp"), PathBuf::from("a.h"), PathBuf::from("b.h")]
        );
    }

    #[test]
    fn parses_trailing_command_line() {
        let d = parse_dep_file("a.o: a.cpp\n\tgcc -c -o a.o a.cpp\n");
        assert_eq!(d.previous_command.as_deref(), Some("gcc -c -o a.o a.cpp"));
    }

    #[test]
    fn missing_file_contents_is_empty() {
        let d = parse_dep_file("");
        assert!(d.headers.is_empty());
        assert!(d.previous_command.is_none());
    }

    #[test]
    fn renders_link_dep_file_format() {
        let rendered = render_link_dep_file("main", &["a.o".to_string(), "b.o".to_string()], "cc -o main a.o b.o");
        assert_eq!(rendered, "main: a.o b.o\n\tcc -o main a.o b.o\n");
    }
}
