use std::path::Path;

use anyhow::Result;
use mm_core::depfile::parse_dep_file;
use mm_core::fs::{FileSystem, RealFileSystem};

/// `matmake depfile <path>`: dump a GCC-style `.d` file's parsed headers
/// and recorded command line, standalone (grounded on the original
/// `matdep` companion tool).
pub fn run(path: &Path) -> Result<()> {
    let fs = RealFileSystem;
    let contents = fs
        .read_to_string(path)
        .ok_or_else(|| anyhow::anyhow!("no dep-file found at {}", path.display()))?;
    let parsed = parse_dep_file(&contents);

    for header in &parsed.headers {
        println!("{}", header.display());
    }
    if let Some(command) = &parsed.previous_command {
        println!("-- previous command --\n{command}");
    }
    Ok(())
}
