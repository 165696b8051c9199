//! End-to-end build scenarios driving the real pipeline
//! (parse-free: properties are built directly) — `calculate_dependencies`
//! -> `prepare_all` -> `mm_sched::run` — against an in-memory filesystem.
//! Mirrors the concrete scenarios the engine's own test suite walks
//! through by hand (single source, shared lib + rpath, header/flag
//! invalidation, failure bailout).

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mm_core::fs::FileSystem;
use mm_core::{calculate_dependencies, prepare_all, BuildResult};
use mm_profile::GccProfile;
use mm_props::TargetPropertyCollection;
use mm_sched::RealTaskSink;
use mm_token::{Location, Token, Tokens};

struct FakeFs {
    mtimes: RefCell<HashMap<String, u64>>,
    contents: RefCell<HashMap<String, String>>,
    clock: RefCell<u64>,
    commands: RefCell<Vec<String>>,
    fail_containing: Option<&'static str>,
}

impl FakeFs {
    fn new() -> Self {
        Self {
            mtimes: RefCell::new(HashMap::new()),
            contents: RefCell::new(HashMap::new()),
            clock: RefCell::new(0),
            commands: RefCell::new(Vec::new()),
            fail_containing: None,
        }
    }

    fn touch(&self, path: &str, time: u64) {
        self.mtimes.borrow_mut().insert(path.to_string(), time);
    }

    fn tick(&self) -> u64 {
        let mut c = self.clock.borrow_mut();
        *c += 1;
        *c
    }

    fn command_count(&self) -> usize {
        self.commands.borrow().len()
    }
}

impl FileSystem for FakeFs {
    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        vec![PathBuf::from(pattern)]
    }

    fn mtime(&self, path: &Path) -> u64 {
        *self.mtimes.borrow().get(&path.display().to_string()).unwrap_or(&0)
    }

    fn create_dir_all(&self, _path: &Path) -> BuildResult<()> {
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        self.contents.borrow().get(&path.display().to_string()).cloned()
    }

    fn write_file(&self, path: &Path, contents: &str) -> BuildResult<()> {
        self.contents.borrow_mut().insert(path.display().to_string(), contents.to_string());
        let t = self.tick();
        self.mtimes.borrow_mut().insert(path.display().to_string(), t);
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> BuildResult<()> {
        let src = self.contents.borrow().get(&from.display().to_string()).cloned().unwrap_or_default();
        self.write_file(to, &src)
    }

    fn run_command(&self, command: &str) -> BuildResult<(i32, String)> {
        self.commands.borrow_mut().push(command.to_string());

        if let Some(needle) = self.fail_containing {
            if command.contains(needle) {
                return Ok((1, "simulated compiler failure".to_string()));
            }
        }

        let tokens: Vec<&str> = command.split_whitespace().collect();
        let o_idx = tokens.iter().position(|t| *t == "-o");
        if let Some(idx) = o_idx {
            let output = tokens[idx + 1];
            let t = self.tick();
            self.mtimes.borrow_mut().insert(output.to_string(), t);

            if command.contains("-MMD") {
                let source = tokens[idx + 2];
                let mf_idx = tokens.iter().position(|t| *t == "-MF").unwrap();
                let dep_path = tokens[mf_idx + 1];
                self.contents
                    .borrow_mut()
                    .insert(dep_path.to_string(), format!("{output}: {source}\n"));
            }
        }

        Ok((0, String::new()))
    }
}

fn tok(s: &str) -> Tokens {
    Tokens::from(Token::new(s, Location::default()))
}

fn run_build(props: &TargetPropertyCollection, fs: &FakeFs) -> mm_sched::RunOutcome {
    let profile = GccProfile;
    let mut graph = calculate_dependencies(props, &profile, fs).unwrap();
    prepare_all(&mut graph, &profile, fs, props, true).unwrap();
    let sink = RealTaskSink::new(fs);
    mm_sched::run(&graph, &sink, 4, true).unwrap()
}

#[test]
fn single_source_executable_is_idempotent_on_second_run() {
    let mut props = TargetPropertyCollection::new();
    props.set("main", "src", tok("a.cpp"), Location::default()).unwrap();
    props.set("main", "out", tok("main"), Location::default()).unwrap();

    let fs = FakeFs::new();
    fs.touch("a.cpp", 1);

    let first = run_build(&props, &fs);
    assert_eq!(first.executed, 2);
    assert_eq!(fs.command_count(), 2);
    let link_command = fs.commands.borrow().last().unwrap().clone();
    assert!(link_command.contains("a.o"));
    assert!(!link_command.contains("a.o.o"));

    let before = fs.command_count();
    let second = run_build(&props, &fs);
    assert_eq!(second.executed, 0);
    assert_eq!(fs.command_count(), before, "no new popen calls on an unchanged tree");
}

#[test]
fn shared_library_link_dependency_gets_pic_and_rpath() {
    let mut props = TargetPropertyCollection::new();
    props
        .set(
            "lib",
            "out",
            {
                let mut t = tok("shared");
                t.append(&tok("lib"));
                t
            },
            Location::default(),
        )
        .unwrap();
    props.set("lib", "src", tok("lib.cpp"), Location::default()).unwrap();
    props.set("main", "src", tok("main.cpp"), Location::default()).unwrap();
    props.set("main", "link", tok("lib"), Location::default()).unwrap();

    let fs = FakeFs::new();
    fs.touch("lib.cpp", 1);
    fs.touch("main.cpp", 1);

    run_build(&props, &fs);

    let commands = fs.commands.borrow();
    let lib_compile = commands.iter().find(|c| c.contains("lib.cpp")).unwrap();
    assert!(lib_compile.contains("-fPIC"), "compiling a shared-lib source must add -fPIC: {lib_compile}");

    let main_link = commands.iter().find(|c| c.contains("-o main ")).unwrap();
    assert!(main_link.contains("-l:lib.so -L ."));
    assert!(main_link.contains("rpath"));
}

#[test]
fn touching_a_tracked_header_only_dirties_the_dependent_compile_and_link() {
    let mut props = TargetPropertyCollection::new();
    props.set("main", "src", tok("a.cpp"), Location::default()).unwrap();
    props.set("main", "out", tok("main"), Location::default()).unwrap();

    let fs = FakeFs::new();
    fs.touch("a.cpp", 1);
    run_build(&props, &fs);
    let after_first = fs.command_count();

    // Simulate the compiler having also recorded `a.h` as a header and the
    // user touching it after the first build.
    let dep_contents = fs.contents.borrow().get("a.o.d").cloned().unwrap();
    let mut lines: Vec<&str> = dep_contents.lines().collect();
    lines[0] = Box::leak(format!("{} a.h", lines[0]).into_boxed_str());
    fs.contents.borrow_mut().insert("a.o.d".to_string(), lines.join("\n") + "\n");
    fs.touch("a.h", 1_000_000);

    let second = run_build(&props, &fs);
    assert!(second.executed >= 1, "touching a tracked header must force a rebuild");
    assert!(fs.command_count() > after_first);
}

#[test]
fn appending_a_flag_invalidates_every_compile_rule_via_command_mismatch() {
    let mut props = TargetPropertyCollection::new();
    props.set("main", "src", tok("a.cpp"), Location::default()).unwrap();
    props.set("main", "out", tok("main"), Location::default()).unwrap();

    let fs = FakeFs::new();
    fs.touch("a.cpp", 1);
    run_build(&props, &fs);
    let after_first = fs.command_count();

    props.append("main", "flags", &tok("-O2"));
    let second = run_build(&props, &fs);

    assert_eq!(second.executed, 2, "command-string change must re-run both compile and link even though mtimes agree");
    assert!(fs.command_count() > after_first);
}

#[test]
fn a_failing_compile_bails_out_before_the_link_rule_runs() {
    let mut props = TargetPropertyCollection::new();
    props.set("a", "src", tok("a.cpp"), Location::default()).unwrap();
    props.set("a", "out", tok("a_out"), Location::default()).unwrap();
    props.set("b", "src", tok("b.cpp"), Location::default()).unwrap();
    props.set("b", "out", tok("b_out"), Location::default()).unwrap();

    let mut fs = FakeFs::new();
    fs.touch("a.cpp", 1);
    fs.touch("b.cpp", 1);
    fs.fail_containing = Some("a.cpp");

    let profile = GccProfile;
    let mut graph = calculate_dependencies(&props, &profile, &fs).unwrap();
    prepare_all(&mut graph, &profile, &fs, &props, true).unwrap();
    let sink = RealTaskSink::new(&fs);
    let result = mm_sched::run(&graph, &sink, 4, true);

    assert!(result.is_err());
    assert!(fs.mtime(Path::new("a_out")) == 0, "the link rule for the failing target never ran");
}
