use std::path::Path;

use anyhow::Result;
use mm_core::fs::{FileSystem, RealFileSystem};

const TEMPLATE: &str = "\
# Matmakefile
main.src = main.cpp
main.out = main
";

/// `matmake init`: scaffold a starter Matmakefile in the current directory.
/// Out of scope for the build engine itself, kept as the stub the
/// original's surrounding tooling also ships alongside the real engine.
pub fn run(makefile: &Path) -> Result<()> {
    let fs = RealFileSystem;
    if fs.read_to_string(makefile).is_some() {
        anyhow::bail!("{} already exists", makefile.display());
    }
    fs.write_file(makefile, TEMPLATE)?;
    println!("wrote {}", makefile.display());
    Ok(())
}
