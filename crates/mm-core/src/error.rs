use derive_more::From;
use mm_token::Location;
use orion_error::{ErrorCode, StructError, UvsReason};

/// Error kinds (spec §7): Configuration, Filesystem, Build, Internal.
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum BuildReason {
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        location: Option<Location>,
    },
    #[error("filesystem error: {message}")]
    Filesystem { message: String },
    #[error("build command failed: {message}\ncommand: {command}\noutput:\n{output}")]
    Build {
        message: String,
        command: String,
        output: String,
    },
    #[error("internal invariant violated: {message}")]
    Internal { message: String },
    #[error("{0}")]
    Uvs(UvsReason),
}

// mm-props/mm-profile already carry the Configuration kind internally; fold
// their errors into our own Configuration variant rather than threading a
// second reason type through the engine's Result alias.
impl From<mm_props::PropsError> for BuildError {
    fn from(e: mm_props::PropsError) -> Self {
        BuildReason::Configuration {
            message: e.to_string(),
            location: None,
        }
        .into()
    }
}

impl From<mm_profile::ProfileError> for BuildError {
    fn from(e: mm_profile::ProfileError) -> Self {
        BuildReason::Configuration {
            message: e.to_string(),
            location: None,
        }
        .into()
    }
}

impl BuildReason {
    pub fn configuration(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::Configuration {
            message: message.into(),
            location,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ErrorCode for BuildReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 5001,
            Self::Filesystem { .. } => 5002,
            Self::Build { .. } => 5003,
            Self::Internal { .. } => 5004,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type BuildError = StructError<BuildReason>;
pub type BuildResult<T> = Result<T, BuildError>;
