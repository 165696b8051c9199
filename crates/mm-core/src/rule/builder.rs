use std::collections::HashMap;
use std::path::PathBuf;

use mm_profile::CompilerProfile;
use mm_props::{TargetProperties, TargetPropertyCollection};

use super::graph::{LinkKind, Rule, RuleGraph, RuleId, RuleKind};
use crate::error::{BuildReason, BuildResult};
use crate::fs::FileSystem;
use crate::path::sanitize;

fn substitute_percent(s: &str, target: &str) -> String {
    s.replace('%', target)
}

/// Mirrors the original `stripFileEnding`: drop the extension of the last
/// path component only (so a directory containing a `.` is untouched).
fn strip_file_ending(s: &str) -> String {
    let (dir, file) = match s.rfind('/') {
        Some(i) => (&s[..=i], &s[i + 1..]),
        None => ("", s),
    };
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}", &file[..dot]),
        _ => s.to_string(),
    }
}

fn trimmed_dir(tp: &TargetProperties, property: &str) -> String {
    let raw = tp.get(property).concat().text;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

fn output_dir_of(tp: &TargetProperties) -> String {
    trimmed_dir(tp, "dir")
}

fn build_dir_of(tp: &TargetProperties) -> String {
    let objdir = trimmed_dir(tp, "objdir");
    if objdir.is_empty() {
        output_dir_of(tp)
    } else {
        objdir
    }
}

fn artifact_kind(tp: &TargetProperties) -> LinkKind {
    let out = tp.get("out");
    let first = out.iter().next().map(|t| t.text.as_str());
    match first {
        Some("shared") => LinkKind::Shared,
        Some("static") => LinkKind::Static,
        _ => LinkKind::Executable,
    }
}

/// `filename()` (spec §4.4 step 1 / original `BuildTarget::filename`):
/// resolves the `out` property into the artifact's path-less name.
fn filename(tp: &TargetProperties, target: &str, profile: &dyn CompilerProfile) -> BuildResult<String> {
    let groups = tp.get("out").groups();
    match groups.len() {
        0 => Ok(target.to_string()),
        1 => Ok(substitute_percent(&groups[0].concat().text, target)),
        _ => {
            let kind_tok = groups[0].concat();
            let name_tok = groups[1].concat();
            let stripped = strip_file_ending(&substitute_percent(&name_tok.text, target));
            match kind_tok.text.as_str() {
                "shared" => Ok(format!("{stripped}{}", profile.shared_suffix())),
                "static" => Ok(format!("{stripped}{}", profile.static_suffix())),
                "exe" => Ok(stripped),
                other => Err(BuildReason::configuration(
                    format!("unknown out= kind '{other}'"),
                    Some(kind_tok.location),
                )
                .into()),
            }
        }
    }
}

/// "calculate dependencies" (spec §4.4): turn parsed `TargetProperties`
/// into the flat rule graph the scheduler will execute.
pub fn calculate_dependencies(
    props: &TargetPropertyCollection,
    profile: &dyn CompilerProfile,
    fs: &dyn FileSystem,
) -> BuildResult<RuleGraph> {
    let mut graph = RuleGraph::new();
    let mut link_rule_of: HashMap<String, RuleId> = HashMap::new();
    let names = props.target_names();

    // Pass 1: every target's LinkRule first, so `link = sibling` can name
    // a target declared later in the file (step 5).
    for &name in &names {
        let tp = props.find_target(name).expect("listed by target_names");
        let kind = artifact_kind(tp);
        let stem = filename(tp, name, profile)?;
        let output = sanitize(&format!("{}{stem}", output_dir_of(tp)));
        let dep_file = sanitize(&format!("{}{stem}.d", build_dir_of(tp)));

        let id = graph.push(Rule {
            id: RuleId(0),
            target: name.to_string(),
            kind: RuleKind::Link { kind },
            output: PathBuf::from(output),
            dep_file: Some(PathBuf::from(dep_file)),
            deps: Vec::new(),
            subscribers: Vec::new(),
            command: None,
            dirty: false,
            location: None,
            include_in_binary: false,
        });
        link_rule_of.insert(name.to_string(), id);
    }

    // Pass 2: compile/copy rules and sibling link-to-link edges.
    for &name in &names {
        let tp = props.find_target(name).expect("listed by target_names");
        let link_id = link_rule_of[name];
        let build_dir = build_dir_of(tp);
        let output_dir = output_dir_of(tp);

        for group in tp.get("src").groups() {
            let pattern_tok = group.concat();
            if pattern_tok.text.is_empty() {
                continue;
            }
            let pattern = substitute_percent(&pattern_tok.text, name);
            for path in fs.glob(&pattern) {
                let filetype = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_lowercase();
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                let obj = sanitize(&format!("{build_dir}{stem}.o"));
                let dep_file = format!("{obj}.d");

                let compile_id = graph.push(Rule {
                    id: RuleId(0),
                    target: name.to_string(),
                    kind: RuleKind::Compile {
                        source: path.clone(),
                        filetype,
                    },
                    output: PathBuf::from(obj),
                    dep_file: Some(PathBuf::from(dep_file)),
                    deps: Vec::new(),
                    subscribers: Vec::new(),
                    command: None,
                    dirty: false,
                    location: Some(pattern_tok.location),
                    include_in_binary: true,
                });
                // Only compile rules feed the link rule's input list
                // (spec §4.4 step 6 — copy rules report
                // `include_in_binary = false` and are never wired here).
                graph.add_dependency(link_id, compile_id);
            }
        }

        for group in tp.get("copy").groups() {
            let pattern_tok = group.concat();
            if pattern_tok.text.is_empty() {
                continue;
            }
            let pattern = substitute_percent(&pattern_tok.text, name);
            for path in fs.glob(&pattern) {
                let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
                let out = sanitize(&format!("{output_dir}{file_name}"));
                if out == path.to_string_lossy() {
                    continue;
                }
                graph.push(Rule {
                    id: RuleId(0),
                    target: name.to_string(),
                    kind: RuleKind::Copy { source: path.clone() },
                    output: PathBuf::from(out),
                    dep_file: None,
                    deps: Vec::new(),
                    subscribers: Vec::new(),
                    command: None,
                    dirty: false,
                    location: Some(pattern_tok.location),
                    include_in_binary: false,
                });
            }
        }

        for group in tp.get("link").groups() {
            let sib_tok = group.concat();
            if sib_tok.text.is_empty() {
                continue;
            }
            let sib_name = substitute_percent(&sib_tok.text, name);
            match link_rule_of.get(&sib_name) {
                Some(&sib_id) => graph.add_dependency(link_id, sib_id),
                None => {
                    return Err(BuildReason::configuration(
                        format!("target '{name}' links unknown target '{sib_name}'"),
                        Some(sib_tok.location),
                    )
                    .into());
                }
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSystem;
    use mm_profile::GccProfile;
    use mm_token::{Location, Token, Tokens};
    use std::path::Path;

    struct FakeFs {
        files: Vec<&'static str>,
    }

    impl FileSystem for FakeFs {
        fn glob(&self, pattern: &str) -> Vec<PathBuf> {
            if !pattern.contains('*') {
                return vec![PathBuf::from(pattern)];
            }
            self.files.iter().map(PathBuf::from).collect()
        }
        fn mtime(&self, _path: &Path) -> u64 {
            1
        }
        fn create_dir_all(&self, _path: &Path) -> BuildResult<()> {
            Ok(())
        }
        fn read_to_string(&self, _path: &Path) -> Option<String> {
            None
        }
        fn write_file(&self, _path: &Path, _contents: &str) -> BuildResult<()> {
            Ok(())
        }
        fn copy_file(&self, _from: &Path, _to: &Path) -> BuildResult<()> {
            Ok(())
        }
        fn run_command(&self, _command: &str) -> BuildResult<(i32, String)> {
            Ok((0, String::new()))
        }
    }

    fn tok(s: &str) -> Tokens {
        Tokens::from(Token::new(s, Location::default()))
    }

    #[test]
    fn single_source_executable_produces_one_compile_and_one_link_rule() {
        let mut props = TargetPropertyCollection::new();
        props.set("main", "src", tok("a.cpp"), Location::default()).unwrap();
        props.set("main", "out", tok("main"), Location::default()).unwrap();

        let fs = FakeFs { files: vec!["a.cpp"] };
        let profile = GccProfile;
        let graph = calculate_dependencies(&props, &profile, &fs).unwrap();

        assert_eq!(graph.len(), 2);
        let link = graph.iter().find(|r| r.kind.is_link()).unwrap();
        assert_eq!(link.deps.len(), 1);
    }

    #[test]
    fn unknown_link_target_is_a_configuration_error() {
        let mut props = TargetPropertyCollection::new();
        props.set("main", "link", tok("missing"), Location::default()).unwrap();
        let fs = FakeFs { files: vec![] };
        let profile = GccProfile;
        assert!(calculate_dependencies(&props, &profile, &fs).is_err());
    }

    #[test]
    fn copy_rule_is_not_wired_into_link_rule() {
        let mut props = TargetPropertyCollection::new();
        props.set("main", "copy", tok("data.txt"), Location::default()).unwrap();

        let fs = FakeFs { files: vec!["data.txt"] };
        let profile = GccProfile;
        let graph = calculate_dependencies(&props, &profile, &fs).unwrap();

        assert_eq!(graph.len(), 2);
        let link = graph.iter().find(|r| r.kind.is_link()).unwrap();
        assert!(link.deps.is_empty());
    }

    #[test]
    fn shared_output_gets_profile_suffix() {
        let mut props = TargetPropertyCollection::new();
        props
            .set("lib", "out", {
                let mut t = tok("shared");
                t.append(&tok("lib"));
                t
            }, Location::default())
            .unwrap();
        let fs = FakeFs { files: vec![] };
        let profile = GccProfile;
        let graph = calculate_dependencies(&props, &profile, &fs).unwrap();
        let link = graph.iter().find(|r| r.kind.is_link()).unwrap();
        assert_eq!(link.output, PathBuf::from("lib.so"));
    }
}
