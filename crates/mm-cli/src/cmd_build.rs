use std::path::Path;

use anyhow::Result;
use mm_core::fs::{FileSystem, RealFileSystem};
use mm_core::mm_warn;
use mm_core::{calculate_dependencies, prepare_all};
use mm_profile::CompilerProfile;
use mm_sched::RealTaskSink;

use crate::config::ProfileChoice;

/// `matmake build [targets...]`: parse the Matmakefile, compute staleness,
/// run everything dirty (spec's top-level build pipeline, grounded on
/// `Environment::compile`'s top-level driver loop).
pub fn run(
    makefile: &Path,
    targets: &[String],
    profile: ProfileChoice,
    threads: usize,
    verbose: bool,
) -> Result<()> {
    let fs = RealFileSystem;
    let contents = fs
        .read_to_string(makefile)
        .ok_or_else(|| anyhow::anyhow!("no Matmakefile found at {}", makefile.display()))?;

    let parsed = mm_parser::parse(&contents)?;

    if !parsed.externals.is_empty() {
        mm_warn!(
            cli,
            count = parsed.externals.len(),
            "Matmakefile declares 'external'/'dependency' directives, which are parsed but not acted on by this build (no multi-directory orchestrator is implemented)"
        );
    }

    if !targets.is_empty() {
        for target in targets {
            if parsed.properties.find_target(target).is_none() {
                anyhow::bail!("unknown target '{target}'");
            }
        }
    }

    match profile {
        ProfileChoice::Gcc => build_with(&parsed.properties, &mm_profile::GccProfile, &fs, verbose, threads, targets)?,
        ProfileChoice::Msvc => build_with(&parsed.properties, &mm_profile::MsvcProfile, &fs, verbose, threads, targets)?,
    }

    Ok(())
}

fn build_with(
    properties: &mm_props::TargetPropertyCollection,
    profile: &dyn CompilerProfile,
    fs: &dyn FileSystem,
    verbose: bool,
    threads: usize,
    targets: &[String],
) -> Result<()> {
    let mut graph = calculate_dependencies(properties, profile, fs)?;
    prepare_all(&mut graph, profile, fs, properties, verbose)?;

    if !targets.is_empty() {
        restrict_to_targets(&mut graph, targets);
    }

    for rule in graph.iter() {
        if rule.dirty {
            if let Some(parent) = rule.output.parent() {
                fs.create_dir_all(parent)?;
            }
        }
    }

    let sink = RealTaskSink::new(fs);
    let outcome = mm_sched::run(&graph, &sink, threads, verbose)?;
    if !verbose {
        println!("built {} rule(s)", outcome.executed);
    }
    Ok(())
}

/// Clears the dirty flag on every rule not reachable (via dependency
/// edges) from a selected target, so an explicit `build foo` only touches
/// `foo` and what it needs.
fn restrict_to_targets(graph: &mut mm_core::RuleGraph, targets: &[String]) {
    let mut keep = vec![false; graph.len()];
    let mut stack: Vec<_> = graph
        .ids()
        .filter(|&id| targets.iter().any(|t| t == &graph.get(id).target))
        .collect();

    while let Some(id) = stack.pop() {
        if keep[id.0] {
            continue;
        }
        keep[id.0] = true;
        stack.extend(graph.get(id).deps.iter().copied());
    }

    for id in graph.ids() {
        if !keep[id.0] {
            graph.get_mut(id).dirty = false;
        }
    }
}
