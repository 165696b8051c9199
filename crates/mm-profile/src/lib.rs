//! Compiler profile (component C3): translates abstract knobs into
//! concrete command-line fragments for a given compiler family.

pub mod error;

pub use error::{ProfileError, ProfileReason, ProfileResult};

/// A compiler family's string/flag contract (spec §4.3). GCC values are
/// the canonical shape the rest of the engine assumes (§6, "Compiler
/// invocation ABI"); other profiles only change the strings.
pub trait CompilerProfile {
    fn include_prefix(&self) -> &str;
    fn system_include_prefix(&self) -> &str;
    fn define_prefix(&self) -> &str;
    fn pic_flag(&self) -> &str;
    fn shared_suffix(&self) -> &str;
    fn static_suffix(&self) -> &str;
    fn rpath_origin_flag(&self) -> &str;
    fn requires_pic_for_shared(&self) -> bool;

    /// Translate a `config` token (e.g. `c++17`, `Wall`, `debug`) into a
    /// compiler flag. Unknown names are a *configuration* error (§4.3).
    fn translate_config(&self, name: &str) -> ProfileResult<String>;

    /// The flag(s) needed to link against a sibling shared/static library
    /// found in `dir` under the name `name` (already suffixed).
    fn static_link_reference(&self, dir: &str, name: &str) -> String;
}

/// GCC / Clang compatible profile (the engine's default and the reference
/// shape for the invocation ABI).
#[derive(Debug, Clone, Copy, Default)]
pub struct GccProfile;

impl CompilerProfile for GccProfile {
    fn include_prefix(&self) -> &str {
        "-I"
    }

    fn system_include_prefix(&self) -> &str {
        "-isystem "
    }

    fn define_prefix(&self) -> &str {
        "-D"
    }

    fn pic_flag(&self) -> &str {
        "-fPIC"
    }

    fn shared_suffix(&self) -> &str {
        ".so"
    }

    fn static_suffix(&self) -> &str {
        ".a"
    }

    fn rpath_origin_flag(&self) -> &str {
        "-Wl,-rpath='${ORIGIN}'"
    }

    fn requires_pic_for_shared(&self) -> bool {
        true
    }

    fn translate_config(&self, name: &str) -> ProfileResult<String> {
        if let Some(std) = name.strip_prefix("c++") {
            return Ok(format!("-std=c++{std}"));
        }
        match name {
            "Wall" => Ok("-Wall".to_string()),
            "debug" => Ok("-g".to_string()),
            "threads" => Ok("-pthread".to_string()),
            "filesystem" => Ok("-lstdc++fs".to_string()),
            "modules" => Ok("-fmodules-ts".to_string()),
            other => Err(ProfileReason::UnknownConfig {
                name: other.to_string(),
            }
            .into()),
        }
    }

    fn static_link_reference(&self, dir: &str, name: &str) -> String {
        format!("-l:{name} -L {dir}")
    }
}

/// MSVC profile (supplemented from `original_source/compilertype.h`; the
/// historical `MSVCCompiler` there never implements `translateConfig`, so
/// this table is filled in from the closest MSVC equivalents).
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvcProfile;

impl CompilerProfile for MsvcProfile {
    fn include_prefix(&self) -> &str {
        "/I"
    }

    fn system_include_prefix(&self) -> &str {
        "/I"
    }

    fn define_prefix(&self) -> &str {
        "/D"
    }

    fn pic_flag(&self) -> &str {
        ""
    }

    fn shared_suffix(&self) -> &str {
        ".dll"
    }

    fn static_suffix(&self) -> &str {
        ".lib"
    }

    fn rpath_origin_flag(&self) -> &str {
        ""
    }

    fn requires_pic_for_shared(&self) -> bool {
        false
    }

    fn translate_config(&self, name: &str) -> ProfileResult<String> {
        if let Some(std) = name.strip_prefix("c++") {
            return Ok(format!("/std:c++{std}"));
        }
        match name {
            "Wall" => Ok("/W4".to_string()),
            "debug" => Ok("/Zi".to_string()),
            "threads" => Ok(String::new()),
            other => Err(ProfileReason::UnknownConfig {
                name: other.to_string(),
            }
            .into()),
        }
    }

    fn static_link_reference(&self, _dir: &str, name: &str) -> String {
        format!("{name}.lib")
    }
}
