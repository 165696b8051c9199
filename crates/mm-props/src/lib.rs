//! Target properties (component C2): a keyed property bag per target with
//! inheritance and list-append/assign semantics.

pub mod error;

use std::collections::{HashMap, HashSet};

pub use error::{PropsError, PropsReason, PropsResult};
use mm_token::{Location, Token, Tokens};

/// Property names the engine itself interprets (spec §3). Anything else is
/// carried opaquely — an unrecognized property is not an error by itself.
pub const RESERVED_PROPERTIES: &[&str] = &[
    "src",
    "copy",
    "link",
    "includes",
    "sysincludes",
    "define",
    "config",
    "flags",
    "cppflags",
    "cflags",
    "libs",
    "out",
    "dir",
    "objdir",
    "cpp",
    "cc",
];

pub const ROOT_TARGET: &str = "root";

/// A single target's property bag.
#[derive(Debug, Clone, Default)]
pub struct TargetProperties {
    pub name: String,
    values: HashMap<String, Tokens>,
}

impl TargetProperties {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Tokens {
        self.values.get(name).cloned().unwrap_or_default()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tokens)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// All targets parsed from a Matmakefile, with an implicit `root` target
/// (spec §3: root is always present and defaults `cpp`/`cc`).
#[derive(Debug, Clone)]
pub struct TargetPropertyCollection {
    targets: Vec<TargetProperties>,
    /// Last `inherit = X` pointer recorded per target, used only to make
    /// multi-level inheritance resolution independent of declaration order
    /// (see DESIGN.md, Open Question: inheritance cycle detection).
    pending_inherit: HashMap<String, String>,
}

impl Default for TargetPropertyCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetPropertyCollection {
    pub fn new() -> Self {
        let mut root = TargetProperties::new(ROOT_TARGET);
        root.values.insert(
            "cpp".to_string(),
            Tokens::from(Token::new("c++", Location::default())),
        );
        root.values.insert(
            "cc".to_string(),
            Tokens::from(Token::new("cc", Location::default())),
        );
        Self {
            targets: vec![root],
            pending_inherit: HashMap::new(),
        }
    }

    pub fn find_target(&self, name: &str) -> Option<&TargetProperties> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetProperties> {
        self.targets.iter()
    }

    /// Non-root target names, in declaration order.
    pub fn target_names(&self) -> Vec<&str> {
        self.targets
            .iter()
            .map(|t| t.name.as_str())
            .filter(|n| *n != ROOT_TARGET)
            .collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }

    fn find_or_create(&mut self, name: &str) -> usize {
        match self.index_of(name) {
            Some(i) => i,
            None => {
                self.targets.push(TargetProperties::new(name));
                self.targets.len() - 1
            }
        }
    }

    pub fn get(&self, target: &str, name: &str) -> Tokens {
        self.find_target(target)
            .map(|t| t.get(name))
            .unwrap_or_default()
    }

    /// `set(target, name, value)` (spec §4.2). `inherit` is special-cased:
    /// it copies every property but `inherit` from the resolved parent.
    pub fn set(&mut self, target: &str, name: &str, value: Tokens, location: Location) -> PropsResult<()> {
        if name == "inherit" {
            let parent = value.concat().text.trim().to_string();
            return self.apply_inherit(target, &parent, location);
        }
        let idx = self.find_or_create(target);
        self.targets[idx].values.insert(name.to_string(), value);
        Ok(())
    }

    /// `append(target, name, value)` (spec §4.2): one-space separator when
    /// the previous last token has no trailing whitespace.
    pub fn append(&mut self, target: &str, name: &str, value: &Tokens) {
        let idx = self.find_or_create(target);
        self.targets[idx]
            .values
            .entry(name.to_string())
            .or_default()
            .append(value);
    }

    /// Follows recorded `inherit` pointers forward from `parent`; true if
    /// the chain ever leads back to `target` (covers direct self-inherit
    /// and multi-target cycles).
    fn creates_cycle(&self, target: &str, parent: &str) -> bool {
        let mut current = parent.to_string();
        let mut seen = HashSet::new();
        loop {
            if current == target {
                return true;
            }
            if !seen.insert(current.clone()) {
                return false;
            }
            match self.pending_inherit.get(&current) {
                Some(next) => current = next.clone(),
                None => return false,
            }
        }
    }

    fn apply_inherit(&mut self, target: &str, parent: &str, location: Location) -> PropsResult<()> {
        if self.creates_cycle(target, parent) {
            return Err(PropsReason::InheritCycle {
                target: target.to_string(),
                location,
            }
            .into());
        }

        let parent_idx = self.find_or_create(parent);
        let parent_values = self.targets[parent_idx].values.clone();
        let target_idx = self.find_or_create(target);
        for (k, v) in parent_values {
            if k != "inherit" {
                self.targets[target_idx].values.insert(k, v);
            }
        }

        self.pending_inherit
            .insert(target.to_string(), parent.to_string());
        Ok(())
    }
}
