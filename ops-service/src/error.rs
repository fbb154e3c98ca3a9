use envelope::ErrorCode;
use thiserror::Error;

/// Service-layer errors: everything that can go wrong between an HTTP
/// request arriving and a validated [`envelope::RequestEnvelope`] reaching
/// the dispatcher. Engine failures are wrapped from [`ops_core::OpsError`]
/// rather than duplicated here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("expected a request envelope")]
    NotARequestEnvelope,

    #[error(transparent)]
    Ops(#[from] ops_core::OpsError),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::NotARequestEnvelope => ErrorCode::RequestError,
            DispatchError::Ops(err) => err.code(),
        }
    }
}
