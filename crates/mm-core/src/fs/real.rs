use std::path::{Path, PathBuf};
use std::process::Command;

use super::FileSystem;
use crate::error::{BuildReason, BuildResult};

/// [`FileSystem`] backed by the host OS (`std::fs` + `sh -c`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        crate::glob::expand_glob(pattern)
    }

    fn mtime(&self, path: &Path) -> u64 {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn create_dir_all(&self, path: &Path) -> BuildResult<()> {
        std::fs::create_dir_all(path).map_err(|e| {
            BuildReason::Filesystem {
                message: format!("create_dir_all {}: {e}", path.display()),
            }
            .into()
        })
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn write_file(&self, path: &Path, contents: &str) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BuildReason::Filesystem {
                message: format!("create_dir_all {}: {e}", parent.display()),
            })?;
        }
        std::fs::write(path, contents).map_err(|e| {
            BuildReason::Filesystem {
                message: format!("write {}: {e}", path.display()),
            }
            .into()
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> BuildResult<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BuildReason::Filesystem {
                message: format!("create_dir_all {}: {e}", parent.display()),
            })?;
        }
        std::fs::copy(from, to).map(|_| ()).map_err(|e| {
            BuildReason::Filesystem {
                message: format!("copy {} -> {}: {e}", from.display(), to.display()),
            }
            .into()
        })
    }

    fn run_command(&self, command: &str) -> BuildResult<(i32, String)> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|e| BuildReason::Filesystem {
                message: format!("spawn '{command}': {e}"),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let code = output.status.code().unwrap_or(-1);
        Ok((code, combined))
    }
}
