use derive_more::From;
use mm_token::Location;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum PropsReason {
    #[error("inheritance cycle detected while resolving target '{target}' ({location})")]
    InheritCycle { target: String, location: Location },
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for PropsReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::InheritCycle { .. } => 3001,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type PropsError = StructError<PropsReason>;
pub type PropsResult<T> = Result<T, PropsError>;
