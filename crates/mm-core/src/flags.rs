use mm_profile::{CompilerProfile, ProfileResult};

/// Inputs to flag composition (spec §4.7: order is semantic).
#[derive(Debug, Clone, Default)]
pub struct FlagInputs {
    pub base_flags: String,
    /// `cppflags` or `cflags`, already selected by file type.
    pub lang_flags: String,
    pub defines: Vec<String>,
    pub configs: Vec<String>,
    pub includes: Vec<String>,
    pub sysincludes: Vec<String>,
    pub pic: bool,
}

/// `flags = base_flags + cppflags?-or-cflags? + defines + configs +
/// includes + (PIC if shared)` (spec §4.7).
pub fn compose_flags(profile: &dyn CompilerProfile, inputs: &FlagInputs) -> ProfileResult<String> {
    let mut parts: Vec<String> = Vec::new();

    if !inputs.base_flags.is_empty() {
        parts.push(inputs.base_flags.clone());
    }
    if !inputs.lang_flags.is_empty() {
        parts.push(inputs.lang_flags.clone());
    }
    for define in &inputs.defines {
        parts.push(format!("{}{define}", profile.define_prefix()));
    }
    for config in &inputs.configs {
        parts.push(profile.translate_config(config)?);
    }
    for include in &inputs.includes {
        parts.push(format!("{}{include}", profile.include_prefix()));
    }
    for include in &inputs.sysincludes {
        parts.push(format!("{}{include}", profile.system_include_prefix()));
    }
    if inputs.pic {
        parts.push(profile.pic_flag().to_string());
    }

    Ok(parts.join(" "))
}
