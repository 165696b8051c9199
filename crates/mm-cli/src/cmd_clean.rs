use std::path::Path;

use anyhow::Result;
use mm_core::fs::{FileSystem, RealFileSystem};

use crate::config::ProfileChoice;

/// `matmake clean`: remove every rule's output and dep-file (grounded on
/// `Dependency::clean`, which is the original's own "delete what I built"
/// pass over the whole graph regardless of dirtiness).
pub fn run(makefile: &Path, profile: ProfileChoice) -> Result<()> {
    let fs = RealFileSystem;
    let contents = fs
        .read_to_string(makefile)
        .ok_or_else(|| anyhow::anyhow!("no Matmakefile found at {}", makefile.display()))?;
    let parsed = mm_parser::parse(&contents)?;

    let graph = match profile {
        ProfileChoice::Gcc => mm_core::calculate_dependencies(&parsed.properties, &mm_profile::GccProfile, &fs)?,
        ProfileChoice::Msvc => mm_core::calculate_dependencies(&parsed.properties, &mm_profile::MsvcProfile, &fs)?,
    };

    let mut removed = 0usize;
    for rule in graph.iter() {
        if remove_if_present(&fs, &rule.output) {
            removed += 1;
        }
        if let Some(dep_file) = &rule.dep_file {
            remove_if_present(&fs, dep_file);
        }
    }
    println!("removed {removed} file(s)");
    Ok(())
}

fn remove_if_present(fs: &dyn FileSystem, path: &Path) -> bool {
    if fs.mtime(path) == 0 {
        return false;
    }
    std::fs::remove_file(path).is_ok()
}
