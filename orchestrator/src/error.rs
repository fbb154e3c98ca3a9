use thiserror::Error;

use crate::conversation::ConversationId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
}

#[derive(Debug, Error)]
pub enum ModelClientError {
    #[error("request to model endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model endpoint returned an unexpected response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolClientError {
    #[error("request to operations service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("operations service returned error {code}: {message}")]
    OperationFailed { code: String, message: String },

    #[error("operations service returned a malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("exhausted {0} retries calling the operations service")]
    RetriesExhausted(u32),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelClientError),

    #[error(transparent)]
    Tool(#[from] ToolClientError),
}
