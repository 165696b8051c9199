use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// Raw TOML shape of an optional `.matmake.toml` (spec's supplemented
/// tool-config ambient concern, following `FusionConfigRaw`'s
/// raw-then-resolve-then-validate shape).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ToolConfigRaw {
    threads: Option<usize>,
    profile: Option<String>,
    verbose: bool,
    log_level: Option<String>,
}

/// Resolved, validated tool configuration.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub threads: usize,
    pub profile: ProfileChoice,
    pub verbose: bool,
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChoice {
    Gcc,
    Msvc,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            profile: ProfileChoice::Gcc,
            verbose: false,
            log_level: "info".to_string(),
        }
    }
}

impl ToolConfig {
    /// Load `.matmake.toml` if it exists; fall back to defaults when it
    /// doesn't (the file is entirely optional).
    pub fn load_optional(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => content.parse(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
        }
    }
}

impl FromStr for ToolConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: ToolConfigRaw = toml::from_str(toml_str)?;
        let defaults = ToolConfig::default();

        let profile = match raw.profile.as_deref() {
            None => defaults.profile,
            Some("gcc") => ProfileChoice::Gcc,
            Some("msvc") => ProfileChoice::Msvc,
            Some(other) => anyhow::bail!("unknown profile '{other}' in .matmake.toml, expected 'gcc' or 'msvc'"),
        };

        Ok(ToolConfig {
            threads: raw.threads.unwrap_or(defaults.threads),
            profile,
            verbose: raw.verbose,
            log_level: raw.log_level.unwrap_or(defaults.log_level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let cfg: ToolConfig = "".parse().unwrap();
        assert_eq!(cfg.profile, ProfileChoice::Gcc);
        assert!(!cfg.verbose);
    }

    #[test]
    fn threads_and_profile_are_overridden() {
        let cfg: ToolConfig = "threads = 4\nprofile = \"msvc\"\n".parse().unwrap();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.profile, ProfileChoice::Msvc);
    }

    #[test]
    fn unknown_profile_name_is_rejected() {
        let result: anyhow::Result<ToolConfig> = "profile = \"borland\"\n".parse();
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = ToolConfig::load_optional("/nonexistent/.matmake.toml").unwrap();
        assert_eq!(cfg.profile, ProfileChoice::Gcc);
    }
}
