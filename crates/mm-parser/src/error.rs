use derive_more::From;
use mm_token::Location;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum ParseReason {
    #[error("{location}: '{line}': are you missing an operator?")]
    MissingOperator { line: String, location: Location },
    #[error("{message}")]
    Properties { message: String },
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for ParseReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::MissingOperator { .. } => 2001,
            Self::Properties { .. } => 2002,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type ParseError = StructError<ParseReason>;
pub type ParseResult<T> = Result<T, ParseError>;

impl From<mm_props::PropsError> for ParseError {
    fn from(e: mm_props::PropsError) -> Self {
        ParseReason::Properties { message: e.to_string() }.into()
    }
}
