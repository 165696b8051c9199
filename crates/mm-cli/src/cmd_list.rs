use std::path::Path;

use anyhow::Result;
use mm_core::fs::{FileSystem, RealFileSystem};

/// `matmake list`: print every buildable target name, plus a synthetic
/// `clean` entry (the original's `listAlternatives` always offers clean
/// as a pseudo-target even though it never appears in the Matmakefile).
pub fn run(makefile: &Path) -> Result<()> {
    let fs = RealFileSystem;
    let contents = fs
        .read_to_string(makefile)
        .ok_or_else(|| anyhow::anyhow!("no Matmakefile found at {}", makefile.display()))?;
    let parsed = mm_parser::parse(&contents)?;

    for name in parsed.properties.target_names() {
        println!("{name}");
    }
    println!("clean");
    Ok(())
}
