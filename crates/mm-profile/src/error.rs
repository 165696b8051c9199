use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum ProfileReason {
    #[error("config '{name}' is not recognized by this compiler profile")]
    UnknownConfig { name: String },
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for ProfileReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::UnknownConfig { .. } => 4001,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type ProfileError = StructError<ProfileReason>;
pub type ProfileResult<T> = Result<T, ProfileError>;
