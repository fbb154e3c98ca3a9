use envelope::ErrorCode;
use thiserror::Error;

/// Engine-level error type. Every variant maps 1:1 onto an [`ErrorCode`] so
/// the service layer can turn it into an `ErrorEnvelope` without guessing.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("file already exists: {0}")]
    FileExists(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("command rejected by deny-list: {0}")]
    ForbiddenCommand(String),

    #[error("command timed out after {0}s")]
    CommandTimeout(u64),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl OpsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OpsError::MissingParameter(_) => ErrorCode::MissingParameter,
            OpsError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            OpsError::PathNotFound(_) => ErrorCode::PathNotFound,
            OpsError::NotADirectory(_) => ErrorCode::NotADirectory,
            OpsError::NotAFile(_) => ErrorCode::NotAFile,
            OpsError::FileExists(_) => ErrorCode::FileExists,
            OpsError::Io(_) => ErrorCode::IoError,
            OpsError::InvalidPattern(_) => ErrorCode::InvalidPattern,
            OpsError::ForbiddenCommand(_) => ErrorCode::ForbiddenCommand,
            OpsError::CommandTimeout(_) => ErrorCode::CommandTimeout,
            OpsError::UnknownOperation(_) => ErrorCode::UnknownOperation,
        }
    }
}

pub type OpsResult<T> = Result<T, OpsError>;
