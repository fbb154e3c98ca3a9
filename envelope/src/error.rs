use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed error taxonomy every `ErrorEnvelope.error_code` is drawn from.
/// Serializes to the exact `SCREAMING_SNAKE_CASE` wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[error("unknown operation")]
    UnknownOperation,
    #[error("missing parameter")]
    MissingParameter,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("path not found")]
    PathNotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("not a file")]
    NotAFile,
    #[error("file exists")]
    FileExists,
    #[error("i/o error")]
    IoError,
    #[error("invalid pattern")]
    InvalidPattern,
    #[error("forbidden command")]
    ForbiddenCommand,
    #[error("command timed out")]
    CommandTimeout,
    #[error("request error")]
    RequestError,
    #[error("stream error")]
    StreamError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownOperation => "UNKNOWN_OPERATION",
            ErrorCode::MissingParameter => "MISSING_PARAMETER",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::PathNotFound => "PATH_NOT_FOUND",
            ErrorCode::NotADirectory => "NOT_A_DIRECTORY",
            ErrorCode::NotAFile => "NOT_A_FILE",
            ErrorCode::FileExists => "FILE_EXISTS",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::InvalidPattern => "INVALID_PATTERN",
            ErrorCode::ForbiddenCommand => "FORBIDDEN_COMMAND",
            ErrorCode::CommandTimeout => "COMMAND_TIMEOUT",
            ErrorCode::RequestError => "REQUEST_ERROR",
            ErrorCode::StreamError => "STREAM_ERROR",
        }
    }

    /// The conventional HTTP status for transports that need one (unary,
    /// SSE-initial, websocket close code mapping).
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::UnknownOperation => 404,
            ErrorCode::MissingParameter | ErrorCode::InvalidParameter | ErrorCode::InvalidPattern => {
                400
            }
            ErrorCode::PathNotFound => 404,
            ErrorCode::NotADirectory | ErrorCode::NotAFile => 400,
            ErrorCode::FileExists => 409,
            ErrorCode::IoError => 500,
            ErrorCode::ForbiddenCommand => 403,
            ErrorCode::CommandTimeout => 504,
            ErrorCode::RequestError => 400,
            ErrorCode::StreamError => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::PathNotFound).unwrap();
        assert_eq!(json, "\"PATH_NOT_FOUND\"");
    }

    #[test]
    fn as_str_matches_wire_value() {
        for code in [ErrorCode::ForbiddenCommand, ErrorCode::CommandTimeout] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }
}
