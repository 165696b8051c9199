use std::path::Path;

use mm_core::depfile::render_link_dep_file;
use mm_core::{BuildReason, BuildResult, Rule, RuleGraph, RuleId, RuleKind, TaskSink};
use mm_core::fs::FileSystem;

/// The default [`TaskSink`]: compile/link rules run their synthesized
/// shell command, copy rules go straight through the file handler
/// (grounded on `Dependency::work` / `CopyFile::work`).
pub struct RealTaskSink<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> RealTaskSink<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }
}

impl TaskSink for RealTaskSink<'_> {
    fn run(&self, graph: &RuleGraph, id: RuleId) -> BuildResult<()> {
        let rule: &Rule = graph.get(id);
        match &rule.kind {
            RuleKind::Copy { source } => self.fs.copy_file(source, &rule.output),
            RuleKind::Compile { .. } | RuleKind::Link { .. } => {
                let Some(command) = &rule.command else {
                    return Ok(());
                };
                let (code, output) = self.fs.run_command(command)?;
                if code != 0 {
                    return Err(BuildReason::Build {
                        message: format!("rule for '{}' failed", rule.target),
                        command: command.clone(),
                        output,
                    }
                    .into());
                }
                // A compile rule's dep-file comes from the compiler's own
                // `-MMD -MF`, which never records the command that produced
                // it. Append it ourselves so the next `prepare` can compare
                // against it (grounded on `Dependency::work`'s
                // `appendToFile(depFile, "\t" + command())`).
                if matches!(rule.kind, RuleKind::Compile { .. }) {
                    if let Some(dep_path) = &rule.dep_file {
                        append_command_line(self.fs, dep_path, command);
                    }
                }
                // A link rule has no compiler-emitted dep-file to append to;
                // it authors its own. That write is part of the rule's work,
                // same as the compile-rule append above, so it only happens
                // once the command has actually run and succeeded — never
                // as a side effect of merely deciding the rule is dirty.
                if matches!(rule.kind, RuleKind::Link { .. }) {
                    if let Some(dep_path) = &rule.dep_file {
                        let inputs: Vec<String> = rule
                            .deps
                            .iter()
                            .map(|&d| graph.get(d))
                            .filter(|dep| dep.include_in_binary)
                            .map(|dep| dep.output.display().to_string())
                            .collect();
                        let rendered = render_link_dep_file(&rule.output.display().to_string(), &inputs, command);
                        self.fs.write_file(dep_path, &rendered)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn append_command_line(fs: &dyn FileSystem, dep_path: &Path, command: &str) {
    let existing = fs.read_to_string(dep_path).unwrap_or_default();
    if existing.lines().any(|line| line.strip_prefix('\t') == Some(command)) {
        return;
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push('\t');
    updated.push_str(command);
    updated.push('\n');
    let _ = fs.write_file(dep_path, &updated);
}
