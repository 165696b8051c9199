mod real;

use std::path::{Path, PathBuf};

pub use real::RealFileSystem;

use crate::error::BuildResult;

/// External file/process collaborator (spec §6, "File-handler interface").
/// Abstracted behind a trait so rules and tests can run against an
/// in-memory double without touching the real filesystem.
pub trait FileSystem: Send + Sync {
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;

    /// Seconds since epoch, or 0 if the path does not exist.
    fn mtime(&self, path: &Path) -> u64;

    fn create_dir_all(&self, path: &Path) -> BuildResult<()>;

    fn read_to_string(&self, path: &Path) -> Option<String>;

    fn write_file(&self, path: &Path, contents: &str) -> BuildResult<()>;

    fn copy_file(&self, from: &Path, to: &Path) -> BuildResult<()>;

    /// `popen`-style synchronous command execution, returning
    /// `(exit_code, combined stdout+stderr)`.
    fn run_command(&self, command: &str) -> BuildResult<(i32, String)>;
}
