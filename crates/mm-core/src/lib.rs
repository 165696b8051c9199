//! Build-graph engine (components C2-C6): turns parsed target properties
//! into a rule graph, decides staleness, and exposes the boundary the
//! scheduler (`mm-sched`) drives work through.

pub mod depfile;
pub mod error;
pub mod flags;
pub mod fs;
pub mod glob;
pub mod log_macros;
pub mod path;
pub mod rule;

pub use error::{BuildError, BuildReason, BuildResult};
pub use rule::{calculate_dependencies, prepare_all, LinkKind, Rule, RuleGraph, RuleId, RuleKind};

/// The handoff boundary to a scheduler (spec §5): something that can take a
/// rule's already-synthesized command and run it, independent of whether
/// that happens on a thread pool, inline, or in a test double.
pub trait TaskSink {
    /// Execute one dirty rule's command. `None` (a copy rule, or a rule
    /// with nothing to do) means "just copy/touch, no shell command".
    fn run(&self, graph: &RuleGraph, id: RuleId) -> BuildResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSystem;
    use mm_profile::GccProfile;
    use mm_props::TargetPropertyCollection;
    use mm_token::{Location, Token, Tokens};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    struct FakeFs {
        mtimes: HashMap<String, u64>,
    }

    impl FileSystem for FakeFs {
        fn glob(&self, pattern: &str) -> Vec<PathBuf> {
            vec![PathBuf::from(pattern)]
        }
        fn mtime(&self, path: &Path) -> u64 {
            *self.mtimes.get(&path.display().to_string()).unwrap_or(&0)
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
    fn end_to_end_single_target_builds_one_compile_then_link() {
        let mut props = TargetPropertyCollection::new();
        props.set("app", "src", tok("main.cpp"), Location::default()).unwrap();
        props.set("app", "out", tok("app"), Location::default()).unwrap();

        let fs = FakeFs {
            mtimes: HashMap::from([("main.cpp".to_string(), 1)]),
        };
        let profile = GccProfile;
        let mut graph = calculate_dependencies(&props, &profile, &fs).unwrap();
        prepare_all(&mut graph, &profile, &fs, &props, false).unwrap();

        let order = graph.topo_order();
        assert_eq!(order.len(), 2);
        assert!(graph.iter().all(|r| r.dirty));
    }
}
